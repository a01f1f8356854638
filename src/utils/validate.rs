use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 校验上传文件的扩展名，返回小写形式（含点号）
pub fn validate_extension<'a>(
    file_name: &str,
    allowed: &'a [String],
) -> Result<&'a str, &'static str> {
    let ext = match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => file_name[idx..].to_ascii_lowercase(),
        _ => return Err("File has no extension"),
    };
    allowed
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(&ext))
        .map(|candidate| candidate.as_str())
        .ok_or("File type is not allowed")
}
