//! The debug-printer-implementation backend (§4.5).

use astgen_resolve::model::{DeclRef, ResolvedFile};

use crate::error::GenerationError;
use crate::shapes::debug_dump_line;

pub fn generate(resolved: &ResolvedFile, basename: &str) -> Result<String, GenerationError> {
    if !resolved.is_visitable_enabled() {
        return Err(GenerationError::AstNotVisitable);
    }

    let mut out = String::new();
    out.push_str(&format!("#include \"{basename}_debug.h\"\n\n"));

    let namespace = resolved.options.get("namespace").flatten();
    if let Some(ns) = namespace {
        out.push_str(&format!("namespace {ns} {{\n\n"));
    }

    for decl in &resolved.declarations {
        let DeclRef::Node(name) = decl else { continue };
        let Some(node) = resolved.node(name) else { continue };
        if node.children.is_empty() {
            out.push_str(&format!("bool DebugPrinter::visit({}* node) {{\n", node.fqn));
            out.push_str(&format!("    out << \"{}\\n\";\n", node.name));
            for field in &node.fields {
                out.push_str(&format!("    {}\n", debug_dump_line(field)));
            }
            for parent_name in &node.parents {
                if let Some(parent) = resolved.node(parent_name) {
                    for field in &parent.fields {
                        out.push_str(&format!("    {}\n", debug_dump_line(field)));
                    }
                }
            }
            out.push_str("    return true;\n}\n\n");
            out.push_str(&format!(
                "void DebugPrinter::post_visit({}* node) {{}}\n\n",
                node.fqn
            ));
        }
    }
    out.push_str("void DebugPrinter::visit_union(const char* field_name) {\n    out << \"  union \" << field_name << \" active\\n\";\n}\n\n");

    if let Some(ns) = namespace {
        out.push_str(&format!("}} // namespace {ns}\n"));
    }
    Ok(out)
}
