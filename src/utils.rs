//! 跨平台的小工具（控制台诊断等）。

/// 非致命诊断：wasm 环境走浏览器控制台，原生测试走标准错误。
pub(crate) fn console_warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("[wasm_adventure] {message}");
}
