use crate::error::{SetupError, SetupResult};
use std::collections::HashMap;

/// Variables available while expanding feed and download URL templates
#[derive(Debug, Default)]
pub struct TemplateVars {
    vars: HashMap<String, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.insert(name.to_string(), value.into());
        self
    }

    /// Expand a template
    ///
    /// Supports:
    /// - ${var} - substitute with variable value
    /// - $${literal} - escape to produce ${literal}
    /// - $$ - a literal $ (Azure DevOps query parameters start with one)
    /// - ${env.VAR} - substitute with environment variable
    pub fn expand(&self, template: &str) -> SetupResult<String> {
        let mut result = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }

            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let mut closed = false;
                    let mut name = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }

                    if !closed {
                        return Err(template_error(template, "unterminated '${'"));
                    }
                    if name.is_empty() {
                        return Err(template_error(template, "empty variable name"));
                    }
                    result.push_str(&self.resolve(template, &name)?);
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    fn resolve(&self, template: &str, name: &str) -> SetupResult<String> {
        if let Some(env_var) = name.strip_prefix("env.") {
            return std::env::var(env_var).map_err(|_| {
                template_error(template, format!("environment variable '{env_var}' not set"))
            });
        }

        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| template_error(template, format!("undefined variable: {name}")))
    }
}

fn template_error(template: &str, message: impl Into<String>) -> SetupError {
    SetupError::Template {
        template: template.to_string(),
        message: message.into(),
    }
}
