/// Normalizes an instance `Name` tag value for display.
///
/// Keeps the part after the first `:` (role/environment prefix) and then the
/// part before the first `.` (domain suffix). Apply once, to the raw tag
/// value: a name with several colons keeps shrinking on repeated calls.
#[must_use]
pub fn normalize_instance_name(raw: &str) -> String {
    let mut name = raw.trim();

    if let Some((_, rest)) = name.split_once(':') {
        name = rest.trim();
    }

    if let Some((head, _)) = name.split_once('.') {
        name = head.trim();
    }

    name.to_owned()
}
