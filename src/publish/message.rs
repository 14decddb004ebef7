use serde::Serialize;
use tinytemplate::error::Error as TemplateError;
use tinytemplate::TinyTemplate;

static TEMPLATE_NAME: &str = "message";

/// The values a message template can refer to.
#[derive(PartialEq, Debug, Serialize)]
pub struct Message<'a> {
    pub category: &'a str,
    pub title: &'a str,
    pub link: &'a str,
}

/// Post text layout, e.g. `{category}: {title}\n#AppleNewsroom\n{link}`.
/// Values are inserted verbatim, without HTML escaping.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    text: String,
}

impl MessageTemplate {
    /// # Errors
    ///
    /// Will return Err if the template does not compile or refers to an unknown value
    pub fn new(text: impl Into<String>) -> Result<Self, TemplateError> {
        let template = Self { text: text.into() };
        template.render(&Message {
            category: "",
            title: "",
            link: "",
        })?;
        Ok(template)
    }

    /// # Errors
    ///
    /// Will return Err if rendering fails
    pub fn render(&self, message: &Message) -> Result<String, TemplateError> {
        let mut tt = TinyTemplate::new();
        tt.set_default_formatter(&tinytemplate::format_unescaped);
        tt.add_template(TEMPLATE_NAME, &self.text)?;
        tt.render(TEMPLATE_NAME, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_MESSAGE_TEMPLATE;
    use rstest::rstest;

    #[rstest]
    #[case(
        "News",
        "a-title",
        "a",
        "News: a-title\n#AppleNewsroom\na"
    )]
    #[case(
        "PRESS RELEASE",
        "Apple & friends <3",
        "https://www.apple.com/newsroom/2024/03/x/",
        "PRESS RELEASE: Apple & friends <3\n#AppleNewsroom\nhttps://www.apple.com/newsroom/2024/03/x/"
    )]
    #[case("", "Untagged", "u", ": Untagged\n#AppleNewsroom\nu")]
    fn it_renders_the_default_template(
        #[case] category: &str,
        #[case] title: &str,
        #[case] link: &str,
        #[case] expected: &str,
    ) {
        let template = MessageTemplate::new(DEFAULT_MESSAGE_TEMPLATE).unwrap();

        let rendered = template
            .render(&Message {
                category,
                title,
                link,
            })
            .unwrap();

        assert_eq!(rendered, expected);
    }

    #[test]
    fn it_renders_a_custom_template() {
        let template = MessageTemplate::new("{title} ({category}) {link} #Releases").unwrap();

        let rendered = template
            .render(&Message {
                category: "Events",
                title: "c-title",
                link: "c",
            })
            .unwrap();

        assert_eq!(rendered, "c-title (Events) c #Releases");
    }

    #[test]
    fn it_rejects_a_template_with_unknown_values() {
        assert!(MessageTemplate::new("{headline}").is_err());
    }

    #[test]
    fn it_rejects_a_template_that_does_not_compile() {
        assert!(MessageTemplate::new("{title").is_err());
    }
}
