//! The nodes-header backend (§4.5): class declarations, one per node.

use astgen_resolve::model::{DeclRef, Model, Node, ResolvedFile};

use crate::dispatch::generate_field;
use crate::error::GenerationError;
use crate::framework::Generator;

pub fn generate(resolved: &ResolvedFile, basename: &str) -> Result<String, GenerationError> {
    let guard = Generator::include_guard(basename);
    let gen = Generator::new(resolved);
    let mut out = String::new();

    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    out.push_str("#include <cstddef>\n#include <map>\n#include <optional>\n#include <vector>\n\n");
    gen.open_namespace(&mut out);
    gen.forward_declarations(&mut out);
    gen.enumerations(&mut out);
    gen.union_declarations(&mut out)?;
    gen.visitor_interface(&mut out);

    for decl in &resolved.declarations {
        let DeclRef::Node(name) = decl else { continue };
        let node = resolved.node(name).expect("orderer only emits declared nodes");
        emit_node_class(&mut out, node, resolved)?;
    }

    gen.close_namespace(&mut out);
    out.push_str(&format!("\n#endif // {guard}\n"));
    Ok(out)
}

fn emit_node_class(out: &mut String, node: &Node, resolved: &ResolvedFile) -> Result<(), GenerationError> {
    let is_parent = !node.children.is_empty();
    let parent_fqn = node
        .parents
        .first()
        .and_then(|p| resolved.node(p))
        .map(|p| p.fqn.clone());

    out.push_str(&match &parent_fqn {
        Some(base) => format!("class {} : public {base} {{\npublic:\n", node.fqn),
        None => format!("class {} {{\npublic:\n", node.fqn),
    });

    if is_parent {
        out.push_str("    virtual ~");
        out.push_str(&node.fqn);
        out.push_str("() = default;\n");
        out.push_str("    virtual const char* get_kind() const = 0;\n");
        out.push_str("    virtual void traverse(Visitor& visitor) = 0;\n");
        for child in &node.children {
            let child_fqn = resolved.node(child).map(|c| c.fqn.clone()).unwrap_or_else(|| child.clone());
            out.push_str(&format!(
                "    virtual bool is_{child}() const {{ return false; }}\n    virtual {child_fqn}* as_{child}() {{ return nullptr; }}\n"
            ));
        }
    } else {
        let params: Vec<String> = node
            .fields
            .iter()
            .map(|f| crate::dispatch::generate_initialiser(f, resolved).map(|i| i.param))
            .collect::<Result<_, _>>()?;
        out.push_str(&format!("    {}({});\n", node.name, params.join(", ")));
        let override_kw = if parent_fqn.is_some() { " override" } else { "" };
        out.push_str(&format!("    ~{}(){override_kw};\n", node.name));
        if parent_fqn.is_some() {
            out.push_str(&format!("    const char* get_kind() const{override_kw};\n"));
            out.push_str(&format!("    bool is_{}() const{override_kw};\n", node.name));
            out.push_str(&format!("    {}* as_{}(){override_kw};\n", node.fqn, node.name));
        }
        out.push_str(&format!("    void traverse(Visitor& visitor){override_kw};\n"));

        for field in &node.fields {
            if field.model == Model::Aggr {
                if let Some(u) = resolved.unions.get(&field.resolved_type) {
                    for variant in &u.variants {
                        out.push_str(&format!(
                            "    void set_{}_kind(const {}& value);\n",
                            field.name,
                            crate::shapes::variant_struct_name(&u.name, &variant.name)
                        ));
                    }
                }
            }
        }
    }

    let mut guard_names: Vec<&String> = node.guards.keys().collect();
    guard_names.sort();
    for guard in guard_names {
        out.push_str(&format!("    bool {guard} = false;\n"));
    }

    for field in &node.fields {
        let decl = generate_field(field, resolved)?;
        for line in decl.lines {
            out.push_str(&format!("    {line}\n"));
        }
    }

    for block in &node.public_blocks {
        out.push_str(block.code.trim_matches('\n'));
        out.push('\n');
    }

    if !node.private_blocks.is_empty() {
        out.push_str("\nprivate:\n");
        for block in &node.private_blocks {
            out.push_str(block.code.trim_matches('\n'));
            out.push('\n');
        }
    }

    out.push_str("};\n\n");
    Ok(())
}
