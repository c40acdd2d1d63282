use crate::error::ViewerError;
use crate::surface::WindowHandle;
use jni::objects::JObject;
use jni::sys::jobject;
use jni::JNIEnv;
use std::ptr::NonNull;

/// Opaque `ANativeWindow` from the NDK.
#[repr(C)]
pub(crate) struct ANativeWindow {
    _private: [u8; 0],
}

#[link(name = "android")]
extern "C" {
    fn ANativeWindow_fromSurface(
        env: *mut jni::sys::JNIEnv,
        surface: jobject,
    ) -> *mut ANativeWindow;
    fn ANativeWindow_release(window: *mut ANativeWindow);
}

/// Owned reference to the native window behind an `android.view.Surface`.
pub(crate) struct NativeWindow {
    ptr: NonNull<ANativeWindow>,
}

// SAFETY: ANativeWindow is reference counted by the platform and may be
// used and released from any thread.
unsafe impl Send for NativeWindow {}

impl NativeWindow {
    /// Acquire the window backing `surface`.
    pub(crate) fn from_surface(env: &mut JNIEnv, surface: &JObject) -> Result<Self, ViewerError> {
        if surface.is_null() {
            return Err(ViewerError::Surface("surface is null".to_string()));
        }

        // SAFETY: `env` is the live JNI environment of the calling thread and
        // `surface` a valid local reference for the duration of the call.
        let ptr = unsafe { ANativeWindow_fromSurface(env.get_raw(), surface.as_raw()) };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr })
            .ok_or_else(|| ViewerError::Surface("ANativeWindow_fromSurface returned null".to_string()))
    }
}

impl WindowHandle for NativeWindow {
    fn as_raw(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl Drop for NativeWindow {
    fn drop(&mut self) {
        // SAFETY: the pointer came from ANativeWindow_fromSurface, which
        // acquired exactly one reference.
        unsafe { ANativeWindow_release(self.ptr.as_ptr()) };
    }
}
