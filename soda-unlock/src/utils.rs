use std::path::{Path, PathBuf};

pub fn format_bytes(bytesval: usize, precision: usize) -> String {
    let mut val = bytesval as f32;

    for unit in ["bytes", "KiB", "MiB", "GiB", "TiB"] {
        if val < 1024.0 {
            return format!("{:.precision$} {}", val, unit, precision = precision);
        }

        val /= 1024.0;
    }

    format!("{:.precision$} PiB", val, precision = precision)
}

/// `<stem>_decrypted.<ext>` next to the input, `m4a` when the input has no extension.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_else(|| "output".into());
    let ext = input
        .extension()
        .map(|ext| ext.to_string_lossy())
        .unwrap_or_else(|| "m4a".into());

    input.with_file_name(format!("{}_decrypted.{}", stem, ext))
}
