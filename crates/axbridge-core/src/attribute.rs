use std::fmt;

/// The closed set of element attributes a client can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Text,
    ContentDescription,
    ClassName,
    ResourceId,
    Bounds,
    Enabled,
    Checkable,
    Checked,
    Clickable,
    Focusable,
    Focused,
    LongClickable,
    Scrollable,
    Selected,
    Displayed,
    Password,
    SelectionStart,
    SelectionEnd,
    Package,
    ContentSize,
}

impl Attribute {
    pub const ALL: [Attribute; 20] = [
        Attribute::Text,
        Attribute::ContentDescription,
        Attribute::ClassName,
        Attribute::ResourceId,
        Attribute::Bounds,
        Attribute::Enabled,
        Attribute::Checkable,
        Attribute::Checked,
        Attribute::Clickable,
        Attribute::Focusable,
        Attribute::Focused,
        Attribute::LongClickable,
        Attribute::Scrollable,
        Attribute::Selected,
        Attribute::Displayed,
        Attribute::Password,
        Attribute::SelectionStart,
        Attribute::SelectionEnd,
        Attribute::Package,
        Attribute::ContentSize,
    ];

    /// Accepts both the hyphenated and the camelCase spellings clients send.
    pub fn from_name(name: &str) -> Option<Self> {
        let attribute = match name {
            "text" => Attribute::Text,
            "content-desc" | "contentDescription" | "name" => Attribute::ContentDescription,
            "class" | "className" => Attribute::ClassName,
            "resource-id" | "resourceId" => Attribute::ResourceId,
            "bounds" => Attribute::Bounds,
            "enabled" => Attribute::Enabled,
            "checkable" => Attribute::Checkable,
            "checked" => Attribute::Checked,
            "clickable" => Attribute::Clickable,
            "focusable" => Attribute::Focusable,
            "focused" => Attribute::Focused,
            "long-clickable" | "longClickable" => Attribute::LongClickable,
            "scrollable" => Attribute::Scrollable,
            "selected" => Attribute::Selected,
            "displayed" => Attribute::Displayed,
            "password" => Attribute::Password,
            "selection-start" | "selectionStart" => Attribute::SelectionStart,
            "selection-end" | "selectionEnd" => Attribute::SelectionEnd,
            "package" => Attribute::Package,
            "content-size" | "contentSize" => Attribute::ContentSize,
            _ => return None,
        };
        Some(attribute)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Text => "text",
            Attribute::ContentDescription => "content-desc",
            Attribute::ClassName => "class",
            Attribute::ResourceId => "resource-id",
            Attribute::Bounds => "bounds",
            Attribute::Enabled => "enabled",
            Attribute::Checkable => "checkable",
            Attribute::Checked => "checked",
            Attribute::Clickable => "clickable",
            Attribute::Focusable => "focusable",
            Attribute::Focused => "focused",
            Attribute::LongClickable => "long-clickable",
            Attribute::Scrollable => "scrollable",
            Attribute::Selected => "selected",
            Attribute::Displayed => "displayed",
            Attribute::Password => "password",
            Attribute::SelectionStart => "selection-start",
            Attribute::SelectionEnd => "selection-end",
            Attribute::Package => "package",
            Attribute::ContentSize => "content-size",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::from_name(attribute.as_str()), Some(attribute));
        }
    }

    #[test]
    fn test_camel_case_aliases() {
        assert_eq!(
            Attribute::from_name("selectionStart"),
            Some(Attribute::SelectionStart)
        );
        assert_eq!(
            Attribute::from_name("contentDescription"),
            Some(Attribute::ContentDescription)
        );
        assert_eq!(Attribute::from_name("resourceId"), Some(Attribute::ResourceId));
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(Attribute::from_name("opacity"), None);
        assert_eq!(Attribute::from_name(""), None);
    }
}
