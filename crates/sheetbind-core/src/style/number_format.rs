//! Number format codes

/// How a number or date is displayed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    #[default]
    General,
    /// A format code such as `#,##0.00` or `yyyy-mm-dd`
    Code(String),
}

impl NumberFormat {
    /// Build from a format code; `General` (any case) and blank map to [`NumberFormat::General`]
    pub fn from_string<S: Into<String>>(code: S) -> Self {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("general") {
            NumberFormat::General
        } else {
            NumberFormat::Code(code)
        }
    }

    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::Code(code) => code,
        }
    }

    /// Whether the code displays a date or time.
    ///
    /// Quoted literals, escaped characters and `[...]` sections (colors,
    /// conditions, locales) are ignored; `[h]`-style elapsed time counts.
    pub fn is_date_format(&self) -> bool {
        let NumberFormat::Code(code) = self else {
            return false;
        };
        let mut chars = code.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => {
                    chars.by_ref().find(|&q| q == '"');
                }
                '\\' => {
                    chars.next();
                }
                '[' => {
                    let section: String = chars.by_ref().take_while(|&b| b != ']').collect();
                    let lower = section.to_ascii_lowercase();
                    if !lower.is_empty() && lower.chars().all(|b| matches!(b, 'h' | 'm' | 's')) {
                        return true;
                    }
                }
                'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => return true,
                _ => {}
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string() {
        assert_eq!(NumberFormat::from_string("general"), NumberFormat::General);
        assert_eq!(NumberFormat::from_string(" "), NumberFormat::General);
        assert_eq!(
            NumberFormat::from_string("0.00%").format_string(),
            "0.00%"
        );
    }

    #[test]
    fn test_is_date_format() {
        assert!(NumberFormat::from_string("yyyy-mm-dd").is_date_format());
        assert!(NumberFormat::from_string("[h]:mm").is_date_format());
        assert!(!NumberFormat::from_string("#,##0.00").is_date_format());
        assert!(!NumberFormat::from_string("[Red]0.00").is_date_format());
        assert!(!NumberFormat::from_string("0 \"days\"").is_date_format());
        assert!(!NumberFormat::General.is_date_format());
    }
}
