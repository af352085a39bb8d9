/// Deterministic artifact file name derived from the project name.
///
/// Non-alphanumeric characters are normalized to `_` so the name is safe for
/// any download target; the suffix is fixed.
pub fn artifact_file_name(project_name: &str) -> String {
    let base: String = project_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let base = base.trim_matches('_');
    if base.is_empty() {
        "project_report.pdf".to_string()
    } else {
        format!("{base}_report.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphanumerics_pass_through() {
        assert_eq!(artifact_file_name("Tower4"), "Tower4_report.pdf");
    }

    #[test]
    fn punctuation_and_spaces_normalize_to_underscores() {
        assert_eq!(
            artifact_file_name("North Wing / Phase 2"),
            "North_Wing___Phase_2_report.pdf"
        );
    }

    #[test]
    fn degenerate_names_still_produce_a_name() {
        assert_eq!(artifact_file_name(""), "project_report.pdf");
        assert_eq!(artifact_file_name("///"), "project_report.pdf");
    }

    #[test]
    fn same_name_same_artifact() {
        assert_eq!(artifact_file_name("Dock 9"), artifact_file_name("Dock 9"));
    }
}
