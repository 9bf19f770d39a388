//! The generator framework (§4.5): file boilerplate, namespace handling,
//! forward declarations, enumeration emission and the visitor interface.
//! Fully specified by the dispatch contract, unlike the per-shape bodies
//! in [`crate::dispatch`]/[`crate::shapes`].

use astgen_resolve::model::{DeclRef, ResolvedFile};

use crate::dispatch::generate_field;
use crate::error::GenerationError;
use crate::shapes::variant_struct_name;

pub struct Generator<'a> {
    pub resolved: &'a ResolvedFile,
}

impl<'a> Generator<'a> {
    pub fn new(resolved: &'a ResolvedFile) -> Self {
        Self { resolved }
    }

    /// §10.5: uppercased basename plus a fixed literal suffix, deterministic
    /// rather than genuinely timestamped so builds stay reproducible.
    pub fn include_guard(basename: &str) -> String {
        let cleaned: String = basename
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{cleaned}_GENERATED_H")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.resolved.options.get("namespace").flatten()
    }

    pub fn open_namespace(&self, out: &mut String) {
        if let Some(ns) = self.namespace() {
            out.push_str(&format!("namespace {ns} {{\n\n"));
        }
    }

    pub fn close_namespace(&self, out: &mut String) {
        if let Some(ns) = self.namespace() {
            out.push_str(&format!("\n}} // namespace {ns}\n"));
        }
    }

    pub fn forward_declarations(&self, out: &mut String) {
        let mut any = false;
        for decl in &self.resolved.declarations {
            if let DeclRef::Node(name) = decl {
                let fqn = self.resolved.node(name).map(|n| n.fqn.as_str()).unwrap_or(name);
                out.push_str(&format!("class {fqn};\n"));
                any = true;
            }
        }
        if any {
            out.push('\n');
        }
    }

    pub fn enumerations(&self, out: &mut String) {
        for decl in &self.resolved.declarations {
            let DeclRef::Enum(name) = decl else { continue };
            let Some(e) = self.resolved.enums.get(name) else { continue };
            out.push_str(&format!("enum class {} {{ {} }};\n\n", e.fqn, e.variants.join(", ")));
        }
    }

    /// Every union variant is emitted as its own plain struct (§4.5 union
    /// runtime), named `{union}_{variant}`, so the owning field's storage
    /// union can name them as members.
    pub fn union_declarations(&self, out: &mut String) -> Result<(), GenerationError> {
        let mut names: Vec<&String> = self.resolved.unions.keys().collect();
        names.sort();
        for name in names {
            let u = &self.resolved.unions[name];
            for variant in &u.variants {
                out.push_str(&format!("struct {} {{\n", variant_struct_name(&u.name, &variant.name)));
                for field in &variant.fields {
                    let decl = generate_field(field, self.resolved)?;
                    for line in decl.lines {
                        out.push_str(&format!("    {line}\n"));
                    }
                }
                out.push_str("};\n\n");
            }
        }
        Ok(())
    }

    /// `visit(X*) -> bool` / `post_visit(X*)` for every leaf node (§4.5
    /// visitor protocol: parent/abstract nodes only ever appear as a
    /// leaf's static base, never as the dynamic type passed to `visit`).
    pub fn visitor_interface(&self, out: &mut String) {
        out.push_str("class Visitor {\npublic:\n    virtual ~Visitor() = default;\n");
        for decl in &self.resolved.declarations {
            let DeclRef::Node(name) = decl else { continue };
            let Some(node) = self.resolved.node(name) else { continue };
            if node.children.is_empty() {
                out.push_str(&format!(
                    "    virtual bool visit({0}* node) {{ return true; }}\n    virtual void post_visit({0}* node) {{}}\n",
                    node.fqn
                ));
            }
        }
        out.push_str("    virtual void visit_union(const char* field_name) {}\n");
        out.push_str("};\n\n");
    }
}
