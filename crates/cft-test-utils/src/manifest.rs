//! [`ManifestBuilder`] for YAML manifest documents.

/// Builds a manifest document field by field.
///
/// Values are written as double-quoted YAML strings so that ids such as
/// `vpc-123` or `10.0.0.0/16` survive unchanged.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    stack_name: String,
    region: String,
    parameters: Vec<(String, Option<String>)>,
    dependent_stacks: Vec<(String, String)>,
    sourced_parameters: Vec<(String, String)>,
    tags: Vec<(String, String)>,
    fields: Vec<(String, String)>,
    raw: Vec<String>,
}

impl ManifestBuilder {
    pub fn new(stack_name: &str, region: &str) -> Self {
        Self {
            stack_name: stack_name.to_string(),
            region: region.to_string(),
            parameters: Vec::new(),
            dependent_stacks: Vec::new(),
            sourced_parameters: Vec::new(),
            tags: Vec::new(),
            fields: Vec::new(),
            raw: Vec::new(),
        }
    }

    pub fn parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.push((name.to_string(), Some(value.to_string())));
        self
    }

    /// A `Parameters` entry with a null value
    pub fn null_parameter(mut self, name: &str) -> Self {
        self.parameters.push((name.to_string(), None));
        self
    }

    pub fn dependent_stack(mut self, alias: &str, stack_name: &str) -> Self {
        self.dependent_stacks
            .push((alias.to_string(), stack_name.to_string()));
        self
    }

    pub fn sourced(mut self, name: &str, reference: &str) -> Self {
        self.sourced_parameters
            .push((name.to_string(), reference.to_string()));
        self
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.push((key.to_string(), value.to_string()));
        self
    }

    pub fn local_template(self, path: &str) -> Self {
        self.field("LocalTemplate", path)
    }

    pub fn s3_template(self, url: &str) -> Self {
        self.field("S3Template", url)
    }

    pub fn timeout(self, timeout: &str) -> Self {
        self.field("TimeOut", timeout)
    }

    pub fn on_failure(self, action: &str) -> Self {
        self.field("OnFailure", action)
    }

    /// Any other top-level string field
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    /// Append YAML verbatim at the top level, e.g. a block-valued field.
    pub fn raw(mut self, yaml: &str) -> Self {
        self.raw.push(yaml.trim_end().to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut out = format!(
            "StackName: {}\nRegion: {}\n",
            quote(&self.stack_name),
            quote(&self.region)
        );

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, quote(value)));
        }

        if !self.parameters.is_empty() {
            out.push_str("Parameters:\n");
            for (name, value) in &self.parameters {
                match value {
                    Some(value) => out.push_str(&format!("  {}: {}\n", name, quote(value))),
                    None => out.push_str(&format!("  {}: null\n", name)),
                }
            }
        }

        push_section(&mut out, "DependentStacks", &self.dependent_stacks);
        push_section(&mut out, "SourcedParameters", &self.sourced_parameters);
        push_section(&mut out, "Tags", &self.tags);

        for block in &self.raw {
            out.push_str(block);
            out.push('\n');
        }

        out
    }
}

fn push_section(out: &mut String, name: &str, entries: &[(String, String)]) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("{}:\n", name));
    for (key, value) in entries {
        out.push_str(&format!("  {}: {}\n", key, quote(value)));
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
