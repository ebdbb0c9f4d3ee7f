use std::{
    ffi::{c_void, OsString},
    os::windows::ffi::OsStringExt,
    path::{Path, PathBuf},
};

use windows::{
    core::w,
    Win32::{
        Foundation::ERROR_SUCCESS,
        System::Registry::{RegGetValueW, HKEY_CURRENT_USER, RRF_RT_REG_SZ},
        UI::WindowsAndMessaging::{
            SystemParametersInfoW, SPIF_SENDCHANGE, SPIF_UPDATEINIFILE, SPI_SETDESKWALLPAPER,
        },
    },
};

use crate::{error::WallpaperError, utility::to_wstring, wallpaper::WallpaperPlatform};

/// Reads `HKCU\Control Panel\Desktop\WallPaper` and applies through
/// `SystemParametersInfoW`, which also persists the choice.
#[derive(Debug, Default)]
pub struct Win32Wallpaper;

impl WallpaperPlatform for Win32Wallpaper {
    fn current_wallpaper(&self) -> Result<PathBuf, WallpaperError> {
        let mut size: u32 = 0;
        let status = unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                w!("Control Panel\\Desktop"),
                w!("WallPaper"),
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut size),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(WallpaperError::Query(format!("RegGetValueW size: {status:?}")));
        }

        let mut buffer = vec![0u16; (size as usize).div_ceil(2)];
        let status = unsafe {
            RegGetValueW(
                HKEY_CURRENT_USER,
                w!("Control Panel\\Desktop"),
                w!("WallPaper"),
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr() as *mut c_void),
                Some(&mut size),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(WallpaperError::Query(format!("RegGetValueW: {status:?}")));
        }

        let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
        if len == 0 {
            return Err(WallpaperError::Query("WallPaper value is empty".into()));
        }
        Ok(PathBuf::from(OsString::from_wide(&buffer[..len])))
    }

    fn set_wallpaper(&mut self, image: &Path) -> Result<(), WallpaperError> {
        let mut wide = to_wstring(&image.to_string_lossy());
        unsafe {
            SystemParametersInfoW(
                SPI_SETDESKWALLPAPER,
                0,
                Some(wide.as_mut_ptr() as *mut c_void),
                SPIF_UPDATEINIFILE | SPIF_SENDCHANGE,
            )
        }
        .map_err(|e| WallpaperError::Apply(format!("SystemParametersInfoW failed: {e:?}")))
    }
}
