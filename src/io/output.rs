use crate::core::{ClassModel, MethodModel, Model};
use clap::ValueEnum;
use colored::*;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parses a configured format name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

pub trait OutputWriter {
    fn write_models(&mut self, models: &[Model]) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_models(&mut self, models: &[Model]) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(models)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// One block per model, using the models' canonical string forms
pub struct TextWriter<W: Write> {
    writer: W,
    color: bool,
}

impl<W: Write> TextWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn write_class(&mut self, class: &ClassModel) -> anyhow::Result<()> {
        let header = class.to_string();
        if self.color {
            writeln!(
                self.writer,
                "{}  {}",
                header.bold().blue(),
                class.qualified_name.dimmed()
            )?;
        } else {
            writeln!(self.writer, "{}  {}", header, class.qualified_name)?;
        }

        if !class.attributes.is_empty() {
            writeln!(self.writer, "  attributes:")?;
            for attribute in &class.attributes {
                writeln!(self.writer, "    {}", attribute)?;
            }
        }
        if !class.methods.is_empty() {
            writeln!(self.writer, "  methods:")?;
            for method in &class.methods {
                writeln!(self.writer, "    {}", method)?;
            }
        }
        Ok(())
    }

    fn write_function(&mut self, function: &MethodModel) -> anyhow::Result<()> {
        if self.color {
            writeln!(self.writer, "{}", function.to_string().bold())?;
        } else {
            writeln!(self.writer, "{}", function)?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TextWriter<W> {
    fn write_models(&mut self, models: &[Model]) -> anyhow::Result<()> {
        for (index, model) in models.iter().enumerate() {
            if index > 0 {
                writeln!(self.writer)?;
            }
            match model {
                Model::Class(class) => self.write_class(class)?,
                Model::Function(function) => self.write_function(function)?,
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

pub fn create_writer<'w>(
    format: OutputFormat,
    destination: Box<dyn Write + 'w>,
    color: bool,
) -> Box<dyn OutputWriter + 'w> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(destination)),
        OutputFormat::Text => Box::new(TextWriter::new(destination).with_color(color)),
    }
}
