//! Per-shape emitter bodies.
//!
//! Non-normative (§4.5, §10.1): the framework and the dispatch contract are
//! the part of this crate with a fixed shape; the C++ text each dispatch
//! entry actually produces is deliberately simple.

use astgen_resolve::model::{Access, Container, Field, Model, ResolvedFile};

use crate::dispatch::dispatch_key;
use crate::error::GenerationError;

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The field's base C++ type spelling, before any container/access wrapping.
pub fn base_type_name(field: &Field, resolved: &ResolvedFile) -> String {
    match field.model {
        Model::Node => resolved
            .nodes
            .get(&field.resolved_type)
            .map(|n| n.fqn.clone())
            .unwrap_or_else(|| field.resolved_type.clone()),
        Model::Enum => resolved
            .enums
            .get(&field.resolved_type)
            .map(|e| e.fqn.clone())
            .unwrap_or_else(|| field.resolved_type.clone()),
        Model::Type => resolved
            .types
            .get(&field.resolved_type)
            .map(|t| t.underlying.trim_end_matches('*').trim().to_string())
            .unwrap_or_else(|| field.resolved_type.clone()),
        Model::Aggr => resolved
            .unions
            .get(&field.resolved_type)
            .map(|u| u.fqn.clone())
            .unwrap_or_else(|| field.resolved_type.clone()),
    }
}

/// Appends a `*` for pointer access, matching the base type spelling otherwise.
pub fn scalar_decl_type(base: &str, access: Access) -> String {
    match access {
        Access::Pointer => format!("{base}*"),
        Access::Object => base.to_string(),
    }
}

/// The nested struct name a union variant is emitted under (§4.5 union
/// runtime): `{union}_{variant}`.
pub fn variant_struct_name(union_name: &str, variant_name: &str) -> String {
    format!("{union_name}_{variant_name}")
}

/// A union field's declaration: discriminator enum, discriminator member,
/// and an uninitialized storage region sized for every variant.
pub fn union_field_decl(field: &Field, resolved: &ResolvedFile) -> Result<Vec<String>, GenerationError> {
    let u = resolved.unions.get(&field.resolved_type).ok_or_else(|| {
        GenerationError::UnsupportedFeature {
            key: dispatch_key(
                "generate_field",
                field.model,
                Some(field.ownership),
                field.access,
                field.container,
            ),
        }
    })?;
    let kind_enum = format!("{}Kind", capitalize(&field.name));
    let variant_names: Vec<&str> = u.variants.iter().map(|v| v.name.as_str()).collect();
    let storage_members: String = u
        .variants
        .iter()
        .map(|v| format!("{} as_{}; ", variant_struct_name(&u.name, &v.name), v.name))
        .collect();
    Ok(vec![
        format!("enum class {kind_enum} {{ none, {} }};", variant_names.join(", ")),
        format!("{kind_enum} {}_kind = {kind_enum}::none;", field.name),
        format!("union {{ {storage_members}}} {}_storage;", field.name),
    ])
}

/// Destructor body for a union field: switch over the discriminator,
/// placement-destroying whichever variant is active.
pub fn union_destroy_lines(field: &Field, resolved: &ResolvedFile) -> Vec<String> {
    let Some(u) = resolved.unions.get(&field.resolved_type) else {
        return Vec::new();
    };
    let kind_enum = format!("{}Kind", capitalize(&field.name));
    let mut lines = vec![format!("switch ({}_kind) {{", field.name)];
    for v in &u.variants {
        let struct_name = variant_struct_name(&u.name, &v.name);
        lines.push(format!("case {kind_enum}::{}:", v.name));
        lines.push(format!("    {}_storage.as_{}.~{struct_name}();", field.name, v.name));
        lines.push("    break;".to_string());
    }
    lines.push(format!("case {kind_enum}::none:"));
    lines.push("    break;".to_string());
    lines.push("}".to_string());
    lines
}

/// `set_{field}_kind`-style setter: destroys whatever variant is active,
/// then placement-constructs the requested one.
pub fn union_setter_lines(field: &Field, resolved: &ResolvedFile, variant: &str) -> Vec<String> {
    let Some(u) = resolved.unions.get(&field.resolved_type) else {
        return Vec::new();
    };
    let kind_enum = format!("{}Kind", capitalize(&field.name));
    let struct_name = variant_struct_name(&u.name, variant);
    let mut lines = union_destroy_lines(field, resolved);
    lines.push(format!(
        "new (&{}_storage.as_{variant}) {struct_name}(value);",
        field.name
    ));
    lines.push(format!("{}_kind = {kind_enum}::{variant};", field.name));
    lines
}

/// One `out << ...` line for the debug printer (§10.1: deliberately simple,
/// non-normative). Pointer-shaped fields report presence rather than
/// dereferencing (the printer never owns the pointee), containers report
/// size, and union fields report their discriminator.
pub fn debug_dump_line(field: &Field) -> String {
    if field.model == Model::Aggr {
        let kind_enum = format!("{}Kind", capitalize(&field.name));
        return format!(
            "out << \"  {0}_kind=\" << static_cast<int>(node->{0}_kind) << \" ({kind_enum})\\n\";",
            field.name
        );
    }
    match field.container {
        Container::Value if field.access == Access::Pointer => {
            format!("out << \"  {0}=\" << (node->{0} ? \"set\" : \"null\") << \"\\n\";", field.name)
        }
        Container::Value => format!("out << \"  {0}=\" << node->{0} << \"\\n\";", field.name),
        Container::Optional => {
            format!("out << \"  {0}=\" << (node->{0} ? \"set\" : \"unset\") << \"\\n\";", field.name)
        }
        Container::Array | Container::DoubleArray | Container::Map | Container::MultiMap => {
            format!("out << \"  {0}.size()=\" << node->{0}.size() << \"\\n\";", field.name)
        }
    }
}

pub fn union_traverse_lines(field: &Field, resolved: &ResolvedFile) -> Vec<String> {
    let Some(_) = resolved.unions.get(&field.resolved_type) else {
        return Vec::new();
    };
    let kind_enum = format!("{}Kind", capitalize(&field.name));
    vec![format!(
        "if ({}_kind != {kind_enum}::none) visitor.visit_union(\"{}\");",
        field.name, field.name
    )]
}
