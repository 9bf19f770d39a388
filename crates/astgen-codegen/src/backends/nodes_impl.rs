//! The nodes-implementation backend (§4.5): constructors, destructors
//! (honouring `cowned` guards), union discriminator setters, `is_X`/`as_X`
//! downcasts and `traverse(visitor&)`.

use astgen_resolve::model::{DeclRef, Model, Node, ResolvedFile};

use crate::dispatch::{generate_destroyer, generate_initialiser, generate_traveller};
use crate::error::GenerationError;
use crate::shapes::union_setter_lines;

pub fn generate(resolved: &ResolvedFile, basename: &str) -> Result<String, GenerationError> {
    let mut out = String::new();
    out.push_str(&format!("#include \"{basename}.h\"\n\n"));

    let namespace = resolved.options.get("namespace").flatten();
    if let Some(ns) = namespace {
        out.push_str(&format!("namespace {ns} {{\n\n"));
    }

    for decl in &resolved.declarations {
        let DeclRef::Node(name) = decl else { continue };
        let node = resolved.node(name).expect("orderer only emits declared nodes");
        if node.children.is_empty() {
            emit_node_methods(&mut out, node, resolved)?;
        }
    }

    if let Some(ns) = namespace {
        out.push_str(&format!("}} // namespace {ns}\n"));
    }
    Ok(out)
}

fn emit_node_methods(out: &mut String, node: &Node, resolved: &ResolvedFile) -> Result<(), GenerationError> {
    let has_parent = !node.parents.is_empty();

    let mut params = Vec::with_capacity(node.fields.len());
    let mut inits = Vec::with_capacity(node.fields.len());
    for field in &node.fields {
        let init = generate_initialiser(field, resolved)?;
        if !init.param.is_empty() {
            params.push(init.param);
        }
        inits.push(init.init);
    }
    let mut guard_names: Vec<&String> = node.guards.keys().collect();
    guard_names.sort();

    out.push_str(&format!("{}::{}({})", node.fqn, node.name, params.join(", ")));
    if !inits.is_empty() {
        out.push_str(&format!("\n    : {}", inits.join(", ")));
    }
    out.push_str(" {}\n\n");

    out.push_str(&format!("{}::~{}() {{\n", node.fqn, node.name));
    for field in &node.fields {
        for line in generate_destroyer(field, resolved)? {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out.push_str("}\n\n");

    if has_parent {
        out.push_str(&format!(
            "const char* {}::get_kind() const {{ return \"{}\"; }}\n\n",
            node.fqn, node.name
        ));
        out.push_str(&format!(
            "bool {}::is_{}() const {{ return true; }}\n\n",
            node.fqn, node.name
        ));
        out.push_str(&format!(
            "{0}* {0}::as_{1}() {{ return this; }}\n\n",
            node.fqn, node.name
        ));
    }

    for field in &node.fields {
        if field.model == Model::Aggr {
            if let Some(u) = resolved.unions.get(&field.resolved_type) {
                for variant in &u.variants {
                    let struct_name = crate::shapes::variant_struct_name(&u.name, &variant.name);
                    out.push_str(&format!(
                        "void {}::set_{}_kind(const {struct_name}& value) {{\n",
                        node.fqn, field.name
                    ));
                    for line in union_setter_lines(field, resolved, &variant.name) {
                        out.push_str(&format!("    {line}\n"));
                    }
                    out.push_str("}\n\n");
                }
            }
        }
    }

    out.push_str(&format!("void {}::traverse(Visitor& visitor) {{\n", node.fqn));
    out.push_str("    if (!visitor.visit(this)) {\n        return;\n    }\n");
    for field in &node.fields {
        for line in generate_traveller(field, resolved)? {
            out.push_str(&format!("    {line}\n"));
        }
    }
    for parent_name in &node.parents {
        if let Some(parent) = resolved.node(parent_name) {
            for field in &parent.fields {
                for line in generate_traveller(field, resolved)? {
                    out.push_str(&format!("    {line}\n"));
                }
            }
        }
    }
    out.push_str("    visitor.post_visit(this);\n");
    out.push_str("}\n\n");

    Ok(())
}
