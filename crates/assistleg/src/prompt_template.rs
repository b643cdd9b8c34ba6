use include_dir::{include_dir, Dir};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tera::{Context, Error as TeraError, Tera};

/// Prompt templates shipped with the crate
static PROMPTS: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/prompts");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render a template file from disk
pub fn load_prompt_file<T: Serialize>(
    template_file: impl Into<PathBuf>,
    context_data: &T,
) -> Result<String, TeraError> {
    let template_path = template_file.into();
    let template_content = fs::read_to_string(&template_path).map_err(|e| {
        TeraError::chain(
            format!("Failed to read template file {}", template_path.display()),
            e,
        )
    })?;
    load_prompt(&template_content, context_data)
}

/// Render one of the prompts shipped with the crate. Never looks at the filesystem.
pub fn load_bundled_prompt<T: Serialize>(name: &str, context_data: &T) -> Result<String, TeraError> {
    let template_content = PROMPTS
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| TeraError::msg(format!("Template not found: {}", name)))?;
    load_prompt(template_content, context_data)
}
