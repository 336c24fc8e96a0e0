use serde::Serialize;
use tinytemplate::TinyTemplate;

/// Renders a string template using `TinyTemplate`.
///
/// Template variables use the `{name}` syntax. Values are inserted verbatim,
/// without HTML escaping, since the output is a prompt rather than markup.
///
/// # Examples
///
/// ```
/// use taskwise::render_template;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Ctx { text: &'static str }
///
/// let out = render_template("Hello {text}!", &Ctx { text: "<world>" }).unwrap();
/// assert_eq!(out, "Hello <world>!");
/// ```
pub fn render_template<T: Serialize>(
    template: &str,
    ctx: &T,
) -> Result<String, tinytemplate::error::Error> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("tpl", template)?;
    tt.render("tpl", ctx)
}
