//! Mount-point stripping and `.`/`..` resolution.

use crate::error::PathError;

/// Splits `raw_path` into filespace-relative segments.
///
/// Absolute paths are resolved against `/` first and must then live under the
/// resolved `mount_point`; anything else is taken as already relative to it.
/// Empty and `.` segments are dropped, `..` pops the previous segment and may
/// never climb above the mount root.
pub fn relative_segments(raw_path: &str, mount_point: &str) -> Result<Vec<String>, PathError> {
    if raw_path.is_empty() {
        return Err(PathError::Empty);
    }
    if raw_path.contains('\0') {
        return Err(PathError::NulByte(raw_path.to_string()));
    }

    let segments = if raw_path.starts_with('/') {
        strip_mount(raw_path, mount_point)?
    } else {
        let mut segments: Vec<&str> = Vec::new();
        for seg in raw_path.split('/') {
            match seg {
                "" | "." => continue,
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathError::EscapesMount(raw_path.to_string()));
                    }
                }
                s => segments.push(s),
            }
        }
        segments
    };

    if segments.is_empty() {
        return Err(PathError::Empty);
    }
    Ok(segments.into_iter().map(str::to_string).collect())
}

/// Resolves an absolute path and returns the segments below the mount.
///
/// A path that passed through the mount before `..` took it back out escapes
/// the mount; any other resolved path outside it is simply outside.
fn strip_mount<'a>(raw_path: &'a str, mount_point: &'a str) -> Result<Vec<&'a str>, PathError> {
    let mount = resolve_absolute(mount_point);
    let mut stack: Vec<&str> = Vec::new();
    let mut entered = false;
    for seg in raw_path.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                stack.pop();
            }
            s => stack.push(s),
        }
        entered |= stack.starts_with(&mount);
    }

    if stack.starts_with(&mount) {
        return Ok(stack.split_off(mount.len()));
    }
    if entered {
        return Err(PathError::EscapesMount(raw_path.to_string()));
    }
    Err(PathError::OutsideMount {
        path: raw_path.to_string(),
        mount_point: mount_point.to_string(),
    })
}

/// Resolves `.`, `..` and repeated separators against `/`. `..` at the root
/// stays at the root.
fn resolve_absolute(path: &str) -> Vec<&str> {
    let mut stack = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                stack.pop();
            }
            s => stack.push(s),
        }
    }
    stack
}
