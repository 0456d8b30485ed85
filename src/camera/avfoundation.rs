//! FFI surface of the AVFoundation capture plugin. Compiled and linked by
//! `build.rs` on macOS only; other targets see the no-device fallbacks at
//! the bottom of this file.

#![allow(dead_code)]

use super::state::{CameraError, FacingMode};

/// Error codes returned by `vetcheck_camera_open`.
const OPEN_ERR_PERMISSION: i32 = -1;
const OPEN_ERR_NOT_FOUND: i32 = -2;
const OPEN_ERR_UNKNOWN: i32 = -3;

fn facing_code(facing: FacingMode) -> u32 {
    match facing {
        FacingMode::User => 0,
        FacingMode::Environment => 1,
    }
}

#[cfg(target_os = "macos")]
mod ffi {
    extern "C" {
        pub fn vetcheck_camera_available() -> bool;
        pub fn vetcheck_camera_permission_granted() -> bool;
        pub fn vetcheck_camera_has_facing(facing: u32) -> bool;
        /// Returns a session handle (>= 0) or a negative error code.
        pub fn vetcheck_camera_open(facing: u32, width: u32, height: u32) -> i32;
        /// Returns an owned JPEG buffer; must be released with
        /// `vetcheck_camera_free_frame`.
        pub fn vetcheck_camera_grab_frame(session: i32, out_length: *mut usize) -> *mut u8;
        pub fn vetcheck_camera_free_frame(ptr: *mut u8);
        pub fn vetcheck_camera_close(session: i32);
    }
}

#[cfg(target_os = "macos")]
pub fn device_available() -> bool {
    unsafe { ffi::vetcheck_camera_available() }
}

#[cfg(target_os = "macos")]
pub fn permission_granted() -> bool {
    unsafe { ffi::vetcheck_camera_permission_granted() }
}

#[cfg(target_os = "macos")]
pub fn has_facing(facing: FacingMode) -> bool {
    unsafe { ffi::vetcheck_camera_has_facing(facing_code(facing)) }
}

#[cfg(target_os = "macos")]
pub fn open_session(facing: FacingMode, width: u32, height: u32) -> Result<i32, CameraError> {
    let handle = unsafe { ffi::vetcheck_camera_open(facing_code(facing), width, height) };
    if handle >= 0 {
        return Ok(handle);
    }
    Err(match handle {
        OPEN_ERR_PERMISSION => CameraError::permission("camera access was denied"),
        OPEN_ERR_NOT_FOUND => CameraError::not_found("no matching camera was found"),
        _ => CameraError::unknown(format!("camera session failed to open (code {handle})")),
    })
}

#[cfg(target_os = "macos")]
pub fn grab_frame(session: i32) -> Result<Vec<u8>, CameraError> {
    unsafe {
        let mut length: usize = 0;
        let ptr = ffi::vetcheck_camera_grab_frame(session, &mut length as *mut usize);

        if ptr.is_null() || length == 0 {
            return Err(CameraError::unknown("capture plugin returned an empty frame"));
        }

        let slice = std::slice::from_raw_parts(ptr, length);
        let data = slice.to_vec();
        ffi::vetcheck_camera_free_frame(ptr);

        Ok(data)
    }
}

#[cfg(target_os = "macos")]
pub fn close_session(session: i32) {
    unsafe {
        ffi::vetcheck_camera_close(session);
    }
}

#[cfg(not(target_os = "macos"))]
pub fn device_available() -> bool {
    false
}

#[cfg(not(target_os = "macos"))]
pub fn permission_granted() -> bool {
    false
}

#[cfg(not(target_os = "macos"))]
pub fn has_facing(_facing: FacingMode) -> bool {
    false
}

#[cfg(not(target_os = "macos"))]
pub fn open_session(_facing: FacingMode, _width: u32, _height: u32) -> Result<i32, CameraError> {
    Err(CameraError::not_supported(
        "camera capture is not supported on this platform",
    ))
}

#[cfg(not(target_os = "macos"))]
pub fn grab_frame(_session: i32) -> Result<Vec<u8>, CameraError> {
    Err(CameraError::not_supported(
        "camera capture is not supported on this platform",
    ))
}

#[cfg(not(target_os = "macos"))]
pub fn close_session(_session: i32) {}
