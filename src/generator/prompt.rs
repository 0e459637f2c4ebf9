//! Prompt templates and placeholder substitution.
//!
//! Each website type has a built-in template. A `<type>.prompt.txt` file in
//! the configured prompt directory replaces it.
//!
//! Placeholders: `${userData}`, `${colorScheme}`, `${customizations}`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::WebsiteType;
use crate::debug;

pub const USER_DATA: &str = "${userData}";
pub const COLOR_SCHEME: &str = "${colorScheme}";
pub const CUSTOMIZATIONS: &str = "${customizations}";

/// System instruction sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "\
You are an expert web developer. Generate a COMPLETE, production-ready website as a single HTML document with embedded CSS and JavaScript.

Rules:
1. Return the entire document; never leave a section unfinished.
2. Close every tag, including </body> and </html>.
3. Put all CSS in <style> tags and all JavaScript in <script> tags.
4. The file must work when opened directly in a browser.
5. If space runs short, finish the structure before polishing styles.

Return only the code, without explanations.";

const COMMON_TAIL: &str = "
USER DATA:
${userData}

COLOR SCHEME: ${colorScheme}

CUSTOMIZATIONS:
${customizations}

REQUIREMENTS:
- Modern CSS (Grid, Flexbox, custom properties), responsive down to mobile
- Accessible markup and readable contrast
- Use the color scheme consistently
- Use the image URLs from the user data as given

Return ONLY the complete HTML document with embedded CSS and JavaScript.
";

const PORTFOLIO: &str = "Create a modern personal portfolio website with these sections:
1. HEADER: logo and navigation
2. HERO: name, title, short bio, profile image, call to action
3. ABOUT: background
4. SKILLS: skills with visual levels
5. PROJECTS: project cards with images and links
6. CONTACT: contact form and social links
7. FOOTER
Add education, certifications, languages or interests only when the data has them.
";

const BUSINESS: &str = "Create a professional business website with these sections:
1. HEADER: logo and navigation
2. HERO: company name, tagline, value proposition, call to action
3. SERVICES: offered services with descriptions
4. ABOUT: company story and mission
5. TEAM: team members, when provided
6. TESTIMONIALS
7. CONTACT: details and form
8. FOOTER
";

const BLOG: &str = "Create a modern blog website with these sections:
1. HEADER: blog name and navigation
2. HERO: description and featured post
3. POSTS: grid of posts with title, excerpt and date
4. SIDEBAR: about, categories, popular posts
5. NEWSLETTER: subscription form
6. FOOTER: social links
";

const EVENT: &str = "Create an event website with these sections:
1. HEADER: logo and navigation
2. HERO: event name, date, location and a countdown timer
3. ABOUT: event details
4. SCHEDULE: timeline
5. SPEAKERS: speakers or performers
6. TICKETS: pricing and registration
7. LOCATION: venue information
8. CONTACT
9. FOOTER
";

const NEWS: &str = "Create a news portal website with these sections:
1. HEADER: logo, navigation and a breaking news ticker
2. HERO: featured story
3. NEWS GRID: latest articles with categories
4. SIDEBAR: trending stories, categories, newsletter
5. FOOTER: links and sitemap
Use a newspaper-inspired layout.
";

const ARTICLE: &str = "Create a long-form article website with these sections:
1. HEADER: logo, navigation and a reading progress indicator
2. HERO: title, subtitle, author, publish date, reading time
3. FEATURE MEDIA: lead image with caption
4. BODY: sections with headings, pull quotes and inline images
5. HIGHLIGHTS: key takeaways
6. AUTHOR BIO: photo and social links
7. CALL TO ACTION: subscribe or share
8. FOOTER
";

/// Built-in template for a website type.
pub fn builtin_template(kind: WebsiteType) -> String {
    let body = match kind {
        WebsiteType::Portfolio => PORTFOLIO,
        WebsiteType::Business => BUSINESS,
        WebsiteType::Blog => BLOG,
        WebsiteType::Event => EVENT,
        WebsiteType::News => NEWS,
        WebsiteType::Article => ARTICLE,
    };
    format!(
        "CRITICAL: generate COMPLETE, ready-to-run HTML. Do not stop mid-document.\n\n{body}{COMMON_TAIL}"
    )
}

/// Template lookup with optional on-disk overrides.
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    dir: Option<PathBuf>,
}

impl PromptLibrary {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn override_path(&self, kind: WebsiteType) -> Option<PathBuf> {
        self.dir
            .as_deref()
            .map(|dir| dir.join(format!("{}.prompt.txt", kind.as_str())))
    }

    /// Override file when present and readable, else the built-in template.
    pub fn template(&self, kind: WebsiteType) -> String {
        if let Some(path) = self.override_path(kind) {
            match read_override(&path) {
                Some(text) => return text,
                None => debug!("prompt"; "no override at {}", path.display()),
            }
        }
        builtin_template(kind)
    }
}

fn read_override(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .filter(|text| !text.trim().is_empty())
}

/// Substitute every placeholder occurrence in `template`.
///
/// `user_data` and `customizations` are pretty-printed JSON; missing
/// customizations become `{}`.
pub fn construct_prompt(
    template: &str,
    user_data: &Value,
    color_scheme: &str,
    customizations: Option<&Value>,
) -> String {
    let empty = Value::Object(Default::default());
    let customizations = pretty(customizations.unwrap_or(&empty));
    let user_data = pretty(user_data);

    substitute(
        template,
        &[
            (USER_DATA, user_data.as_str()),
            (COLOR_SCHEME, color_scheme),
            (CUSTOMIZATIONS, customizations.as_str()),
        ],
    )
}

/// Single pass, so substituted values are never scanned for placeholders.
fn substitute(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match pairs.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push_str("${");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_templates_have_placeholders() {
        for kind in WebsiteType::ALL {
            let template = builtin_template(kind);
            assert!(template.contains(USER_DATA), "{kind}");
            assert!(template.contains(COLOR_SCHEME), "{kind}");
            assert!(template.contains(CUSTOMIZATIONS), "{kind}");
        }
    }

    #[test]
    fn test_construct_prompt_replaces_every_occurrence() {
        let template = "a ${colorScheme} b ${colorScheme} c ${userData} d ${customizations}";
        let prompt = construct_prompt(template, &json!({"name": "Jane"}), "sunset", None);
        assert_eq!(prompt.matches("sunset").count(), 2);
        assert!(prompt.contains("\"name\": \"Jane\""));
        assert!(prompt.ends_with("d {}"));
        assert!(!prompt.contains("${"));
    }

    #[test]
    fn test_construct_prompt_does_not_expand_user_text() {
        let prompt = construct_prompt(
            "${userData} | ${colorScheme}",
            &json!({"bio": "I like ${colorScheme}"}),
            "red",
            Some(&json!({"layout": "grid"})),
        );
        assert!(prompt.contains("I like ${colorScheme}"));
        assert!(prompt.ends_with("| red"));
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let prompt = construct_prompt("${other} ${colorScheme}", &json!({}), "blue", None);
        assert_eq!(prompt, "${other} blue");
    }

    #[test]
    fn test_override_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("blog.prompt.txt"), "custom ${userData}").unwrap();
        let library = PromptLibrary::new(Some(temp.path().to_path_buf()));

        assert_eq!(library.template(WebsiteType::Blog), "custom ${userData}");
        assert_eq!(
            library.template(WebsiteType::News),
            builtin_template(WebsiteType::News)
        );
    }

    #[test]
    fn test_empty_override_ignored() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("event.prompt.txt"), "  \n").unwrap();
        let library = PromptLibrary::new(Some(temp.path().to_path_buf()));
        assert_eq!(library.template(WebsiteType::Event), builtin_template(WebsiteType::Event));
    }
}
