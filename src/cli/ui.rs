use console::style;

/// Defines different styles for console messages.
pub enum StyleType {
    Prompt,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Prompt => style(text).bold(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}
