//! The debug-printer-header backend (§4.5): a `Visitor` implementation
//! that dumps each node's fields to a stream. Refused when the file has
//! no `visitable` option (§7 Generation: `ast-not-visitable`).

use astgen_resolve::model::{DeclRef, ResolvedFile};

use crate::dispatch::generate_field;
use crate::error::GenerationError;
use crate::framework::Generator;

pub fn generate(resolved: &ResolvedFile, basename: &str) -> Result<String, GenerationError> {
    if !resolved.is_visitable_enabled() {
        return Err(GenerationError::AstNotVisitable);
    }

    let guard = Generator::include_guard(&format!("{basename}_debug"));
    let mut out = String::new();
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str(&format!("#include \"{basename}.h\"\n#include <ostream>\n\n"));

    let gen = Generator::new(resolved);
    gen.open_namespace(&mut out);

    // Union-typed fields carry their discriminator/storage declaration into
    // the debug header as a comment, so the dumper's author can see which
    // fields it will report on without re-reading the nodes header.
    for decl in &resolved.declarations {
        let DeclRef::Node(name) = decl else { continue };
        let Some(node) = resolved.node(name) else { continue };
        for field in &node.fields {
            let info = generate_field(field, resolved)?;
            if info.debug_in_header {
                out.push_str(&format!("// {}.{} is a union field: {}\n", node.fqn, field.name, field.resolved_type));
            }
        }
    }

    out.push_str("class DebugPrinter : public Visitor {\npublic:\n");
    out.push_str("    explicit DebugPrinter(std::ostream& stream) : out(stream) {}\n\n");
    for decl in &resolved.declarations {
        let DeclRef::Node(name) = decl else { continue };
        let Some(node) = resolved.node(name) else { continue };
        if node.children.is_empty() {
            out.push_str(&format!(
                "    bool visit({0}* node) override;\n    void post_visit({0}* node) override;\n",
                node.fqn
            ));
        }
    }
    out.push_str("    void visit_union(const char* field_name) override;\n\n");
    out.push_str("private:\n    std::ostream& out;\n};\n\n");

    gen.close_namespace(&mut out);
    out.push_str(&format!("\n#endif // {guard}\n"));
    Ok(out)
}
