//! NetCDF header inspection
//!
//! Prints what a velocity product contains before anything is extracted:
//! global attributes, dimensions, and each variable with its shape and the
//! attributes that matter for plotting (units, long name, fill value).

use crate::errors::Result;
use netcdf::{AttributeValue, File, Variable};

/// Prints global attributes, dimensions and variables of a NetCDF file.
pub fn print_metadata(file: &File) -> Result<()> {
    println!("\n===== Global Attributes =====");
    for attr in file.attributes() {
        println!("- {}: {}", attr.name(), format_value(&attr.value()?));
    }

    println!("\n===== Dimensions =====");
    let mut dimensions: Vec<_> = file.dimensions().collect();
    dimensions.sort_by(|a, b| a.name().cmp(&b.name()));
    if dimensions.is_empty() {
        println!("   (No dimensions found)");
    }
    for dim in dimensions {
        let length_info = if dim.is_unlimited() {
            format!("{} (unlimited)", dim.len())
        } else {
            dim.len().to_string()
        };
        println!("    {} = {}", dim.name(), length_info);
    }

    println!("\n===== Variables =====");
    for var in file.variables() {
        println!("{}", describe_variable(&var));
        let key_attrs = key_attributes(&var);
        if !key_attrs.is_empty() {
            println!("      └─ {}", key_attrs.join(", "));
        }
    }

    Ok(())
}

/// `name (type): [dims] = (shape)` or `name (type): scalar`
pub fn describe_variable(var: &Variable) -> String {
    let data_type = format!("{:?}", var.vartype()).to_lowercase();
    let dims: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let shape: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.len().to_string())
        .collect();

    if dims.is_empty() {
        format!("    {} ({}): scalar", var.name(), data_type)
    } else {
        format!(
            "    {} ({}): [{}] = ({})",
            var.name(),
            data_type,
            dims.join(", "),
            shape.join(" × ")
        )
    }
}

fn key_attributes(var: &Variable) -> Vec<String> {
    ["units", "long_name", "_FillValue"]
        .iter()
        .filter_map(|key| {
            let value = var.attribute(key)?.value().ok()?;
            Some(format!("{}: {}", key, format_value(&value)))
        })
        .collect()
}

fn format_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Str(s) => s.clone(),
        AttributeValue::Float(v) => v.to_string(),
        AttributeValue::Double(v) => v.to_string(),
        AttributeValue::Int(v) => v.to_string(),
        AttributeValue::Short(v) => v.to_string(),
        other => format!("{:?}", other),
    }
}
