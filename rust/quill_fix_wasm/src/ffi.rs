// Raw wasm ABI: the host copies UTF-8 into memory from `alloc`, passes
// (ptr, len), and reads results back through `last_len` / `last_err_*`.

static mut LAST_LEN: u32 = 0;
static mut LAST_ERR_PTR: u32 = 0;
static mut LAST_ERR_LEN: u32 = 0;
static mut LAST_ERR_CODE: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    EmptyInput = 1,
    InvalidUtf8 = 2,
    InvalidJson = 3,
}

impl ErrorCode {
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::EmptyInput => "empty input",
            ErrorCode::InvalidUtf8 => "input is not valid UTF-8",
            ErrorCode::InvalidJson => "input is not valid JSON",
        }
    }
}

#[no_mangle]
pub extern "C" fn last_len() -> u32 {
    unsafe { LAST_LEN }
}

#[no_mangle]
pub extern "C" fn last_err_ptr() -> u32 {
    unsafe { LAST_ERR_PTR }
}

#[no_mangle]
pub extern "C" fn last_err_len() -> u32 {
    unsafe { LAST_ERR_LEN }
}

#[no_mangle]
pub extern "C" fn last_err_code() -> u32 {
    unsafe { LAST_ERR_CODE }
}

#[no_mangle]
pub extern "C" fn clear_last_error() {
    unsafe {
        LAST_ERR_PTR = 0;
        LAST_ERR_LEN = 0;
        LAST_ERR_CODE = 0;
    }
}

#[no_mangle]
pub extern "C" fn alloc(size: u32) -> u32 {
    let mut buf = Vec::<u8>::with_capacity(size as usize);
    let ptr = buf.as_mut_ptr() as u32;
    std::mem::forget(buf);
    ptr
}

#[no_mangle]
pub extern "C" fn dealloc(ptr: u32, size: u32) {
    if ptr == 0 || size == 0 {
        return;
    }
    unsafe {
        let _ = Vec::<u8>::from_raw_parts(ptr as *mut u8, size as usize, size as usize);
    }
}

/// Records an error for the host and returns the null result pointer.
/// The host frees `last_err_ptr` with `last_err_len`.
pub fn set_error(code: ErrorCode, detail: &str) -> u32 {
    let message = if detail.is_empty() {
        code.message().to_string()
    } else {
        format!("{}: {}", code.message(), detail)
    };
    let mut out = message.into_bytes();
    unsafe {
        LAST_ERR_CODE = code as u32;
        LAST_LEN = 0;
        LAST_ERR_LEN = out.len() as u32;
        LAST_ERR_PTR = out.as_mut_ptr() as u32;
    }
    std::mem::forget(out);
    0
}

pub fn read_utf8(ptr: u32, len: u32) -> Result<&'static str, ErrorCode> {
    if ptr == 0 || len == 0 {
        return Err(ErrorCode::EmptyInput);
    }
    let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, len as usize) };
    std::str::from_utf8(bytes).map_err(|_| ErrorCode::InvalidUtf8)
}

/// Hands `text` to the host; the host frees it with `last_len`.
pub fn write_out(text: &str) -> u32 {
    clear_last_error();
    let mut out = text.as_bytes().to_vec();
    unsafe {
        LAST_LEN = out.len() as u32;
    }
    let out_ptr = out.as_mut_ptr() as u32;
    std::mem::forget(out);
    out_ptr
}

/// Reads the input, runs `f`, and publishes either its output or its error.
pub fn with_input(ptr: u32, len: u32, f: impl FnOnce(&str) -> Result<String, (ErrorCode, String)>) -> u32 {
    let input = match read_utf8(ptr, len) {
        Ok(s) => s,
        Err(code) => return set_error(code, ""),
    };
    match f(input) {
        Ok(out) => write_out(&out),
        Err((code, detail)) => set_error(code, &detail),
    }
}
