//! README.md shipped with every generated website.

use crate::core::WebsiteType;

/// Render the README for a website generated at `generated_at` (RFC 3339).
pub fn render(kind: WebsiteType, generated_at: &str) -> String {
    format!(
        "# Generated {title} Website

This website was generated by sitesmith from your form data.

- Generated on: {generated_at}
- Website Type: {kind}
- Technology: Pure HTML, CSS, JavaScript

## How to Use
1. Open index.html in your web browser
2. Deploy the folder to any static hosting service

Images live in the `assets/` folder next to `index.html`.

## Customization
Edit the HTML, CSS and JavaScript in index.html to change content and styling.
",
        title = kind.display_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let readme = render(WebsiteType::Event, "2024-06-15T14:30:45Z");
        assert!(readme.starts_with("# Generated Event Website\n"));
        assert!(readme.contains("- Generated on: 2024-06-15T14:30:45Z"));
        assert!(readme.contains("- Website Type: event"));
    }
}
