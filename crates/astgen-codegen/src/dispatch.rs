//! The dispatch contract (§4.5): a total function from the resolved
//! field's `(model, ownership, access, container)` tuple to emitted text,
//! implemented as exhaustive Rust pattern matching (§9 design note) rather
//! than the source's string-keyed reflective method lookup.
//!
//! Each backend still reports `UnsupportedFeature` with the exact
//! `{verb}_{model}_{ownership}_{access}_{container}` key (§8 invariant 6)
//! when a lookup that should always succeed fails anyway -- e.g. a field
//! whose `resolved_type` names a union that somehow isn't in the resolved
//! file's union table.

use astgen_resolve::model::{Access, Container, Field, Model, Ownership, ResolvedFile};

use crate::error::GenerationError;
use crate::shapes::{base_type_name, scalar_decl_type, union_destroy_lines, union_field_decl, union_traverse_lines};

/// Builds the exact dispatch key named in §4.5. The `generate_traveller`
/// verb omits ownership.
pub fn dispatch_key(
    verb: &str,
    model: Model,
    ownership: Option<Ownership>,
    access: Access,
    container: Container,
) -> String {
    match ownership {
        Some(o) => format!("{verb}_{model}_{o}_{access}_{container}"),
        None => format!("{verb}_{model}_{access}_{container}"),
    }
}

/// A field's declaration text plus whether the debug backend should emit
/// it in the struct body (`false`) or alongside the header's forward
/// declarations (`true`) -- unions carry their discriminator/storage
/// trio into the debug header so the dumper can name the active variant
/// without re-deriving the union's shape.
pub struct FieldDecl {
    pub lines: Vec<String>,
    pub debug_in_header: bool,
}

pub fn generate_field(field: &Field, resolved: &ResolvedFile) -> Result<FieldDecl, GenerationError> {
    if field.model == Model::Aggr {
        return Ok(FieldDecl {
            lines: union_field_decl(field, resolved)?,
            debug_in_header: true,
        });
    }

    let base = base_type_name(field, resolved);
    let decorated = scalar_decl_type(&base, field.access);
    let line = match field.container {
        Container::Value => format!("{decorated} {};", field.name),
        Container::Optional => format!("std::optional<{decorated}> {};", field.name),
        Container::Array => format!("std::vector<{decorated}> {};", field.name),
        Container::DoubleArray => format!("std::vector<std::vector<{decorated}>> {};", field.name),
        Container::Map => {
            let key_ty = field.attributes.get("map").flatten().unwrap_or("").to_string();
            format!("std::map<{key_ty}, {decorated}> {};", field.name)
        }
        Container::MultiMap => {
            let key_ty = field.attributes.get("mmap").flatten().unwrap_or("").to_string();
            format!("std::multimap<{key_ty}, {decorated}> {};", field.name)
        }
    };
    Ok(FieldDecl {
        lines: vec![line],
        debug_in_header: false,
    })
}

/// A field's constructor parameter declaration plus its member-init-list
/// entry.
pub struct FieldInit {
    pub param: String,
    pub init: String,
}

pub fn generate_initialiser(field: &Field, resolved: &ResolvedFile) -> Result<FieldInit, GenerationError> {
    if field.model == Model::Aggr {
        return Ok(FieldInit {
            param: String::new(),
            init: format!("{}_kind({}Kind::none)", field.name, crate::shapes::capitalize(&field.name)),
        });
    }

    let base = base_type_name(field, resolved);
    let decorated = scalar_decl_type(&base, field.access);
    let value_default = field.default.clone().or_else(|| {
        if field.model == Model::Type {
            resolved.types.get(&field.resolved_type).and_then(|t| t.default.clone())
        } else {
            None
        }
    });
    let (param_ty, default_expr) = match field.container {
        Container::Value => (decorated, value_default),
        Container::Optional => (format!("std::optional<{decorated}>"), Some("std::nullopt".to_string())),
        Container::Array => (format!("std::vector<{decorated}>"), Some("{}".to_string())),
        Container::DoubleArray => (
            format!("std::vector<std::vector<{decorated}>>"),
            Some("{}".to_string()),
        ),
        Container::Map => {
            let key_ty = field.attributes.get("map").flatten().unwrap_or("").to_string();
            (format!("std::map<{key_ty}, {decorated}>"), Some("{}".to_string()))
        }
        Container::MultiMap => {
            let key_ty = field.attributes.get("mmap").flatten().unwrap_or("").to_string();
            (
                format!("std::multimap<{key_ty}, {decorated}>"),
                Some("{}".to_string()),
            )
        }
    };
    let param = match default_expr {
        Some(expr) => format!("{param_ty} {} = {expr}", field.name),
        None => format!("{param_ty} {}", field.name),
    };
    Ok(FieldInit {
        param,
        init: format!("{}({})", field.name, field.name),
    })
}

/// Destructor body lines for a field, honouring `cowned` guards (§8 S4).
pub fn generate_destroyer(field: &Field, resolved: &ResolvedFile) -> Result<Vec<String>, GenerationError> {
    if field.model == Model::Aggr {
        return Ok(union_destroy_lines(field, resolved));
    }
    if field.ownership == Ownership::Reference {
        return Ok(Vec::new());
    }
    if field.access != Access::Pointer {
        return Ok(Vec::new());
    }

    let body = match field.container {
        Container::Value => vec![format!("delete {};", field.name)],
        Container::Optional => vec![
            format!("if ({}) {{", field.name),
            format!("    delete *{};", field.name),
            "}".to_string(),
        ],
        Container::Array | Container::DoubleArray => {
            vec![format!("for (auto* item : {}) delete item;", field.name)]
        }
        Container::Map | Container::MultiMap => {
            vec![format!("for (auto& [key, value] : {}) delete value;", field.name)]
        }
    };

    if field.ownership == Ownership::Conditional {
        let guard = field
            .attributes
            .get("cowned")
            .flatten()
            .filter(|s| !s.is_empty())
            .unwrap_or("_owns_fields");
        let mut wrapped = vec![format!("if ({guard}) {{")];
        wrapped.extend(body.into_iter().map(|line| format!("    {line}")));
        wrapped.push("}".to_string());
        Ok(wrapped)
    } else {
        Ok(body)
    }
}

/// `traverse(visitor&)` body lines for a visitable field. Non-visitable
/// fields are skipped by the caller before this is ever invoked, matching
/// the traveller verb's ownership-omitting key.
pub fn generate_traveller(field: &Field, resolved: &ResolvedFile) -> Result<Vec<String>, GenerationError> {
    if !field.is_visitable {
        return Ok(Vec::new());
    }
    if field.model == Model::Aggr {
        return Ok(union_traverse_lines(field, resolved));
    }

    let body = match field.container {
        Container::Value => vec![format!("if ({0}) {0}->traverse(visitor);", field.name)],
        Container::Optional => vec![
            format!("if ({}) {{", field.name),
            format!("    if (*{0}) (*{0})->traverse(visitor);", field.name),
            "}".to_string(),
        ],
        Container::Array | Container::DoubleArray => vec![format!(
            "for (auto* item : {}) {{ if (item) item->traverse(visitor); }}",
            field.name
        )],
        Container::Map | Container::MultiMap => vec![format!(
            "for (auto& [key, value] : {}) {{ if (value) value->traverse(visitor); }}",
            field.name
        )],
    };
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use astgen_parser::parse;

    fn resolve(src: &str) -> ResolvedFile {
        astgen_resolve::resolve(parse(src).unwrap()).unwrap()
    }

    #[test]
    fn value_node_field_declares_a_raw_pointer() {
        let file = resolve("class Inner;\nclass Outer (child: Inner);");
        let field = &file.node("Outer").unwrap().fields[0];
        let decl = generate_field(field, &file).unwrap();
        assert_eq!(decl.lines, vec!["Inner* child;".to_string()]);
        assert!(!decl.debug_in_header);
    }

    #[test]
    fn array_of_owned_nodes_declares_a_vector() {
        let file = resolve("class Stmt;\nclass X (body: Stmt[]);");
        let field = &file.node("X").unwrap().fields[0];
        let decl = generate_field(field, &file).unwrap();
        assert_eq!(decl.lines, vec!["std::vector<Stmt*> body;".to_string()]);
    }

    #[test]
    fn optional_field_wraps_in_std_optional() {
        let file = resolve("class Stmt;\nclass X (note?: Stmt);");
        let field = &file.node("X").unwrap().fields[0];
        let decl = generate_field(field, &file).unwrap();
        assert_eq!(decl.lines, vec!["std::optional<Stmt*> note;".to_string()]);
        let init = generate_initialiser(field, &file).unwrap();
        assert_eq!(init.param, "std::optional<Stmt*> note = std::nullopt");
    }

    #[test]
    fn cowned_field_destructor_is_guard_wrapped() {
        let file = resolve("class Stmt;\nclass Y ([[cowned]] t: Stmt);");
        let field = &file.node("Y").unwrap().fields[0];
        let lines = generate_destroyer(field, &file).unwrap();
        assert_eq!(
            lines,
            vec![
                "if (_owns_fields) {".to_string(),
                "    delete t;".to_string(),
                "}".to_string(),
            ]
        );
    }

    #[test]
    fn reference_field_is_never_deleted() {
        let file = resolve("class A;\nclass B (a&: A);");
        let field = &file.node("B").unwrap().fields[0];
        assert!(generate_destroyer(field, &file).unwrap().is_empty());
    }

    #[test]
    fn non_visitable_field_skips_traversal() {
        let file = resolve("class A;\nclass B (a&: A);");
        let field = &file.node("B").unwrap().fields[0];
        assert!(generate_traveller(field, &file).unwrap().is_empty());
    }

    #[test]
    fn union_field_declares_discriminator_and_storage() {
        let src = "union V { class A (x: int); class B (y: int); };\n#define int int\nclass W (v: V);";
        let file = resolve(src);
        let field = &file.node("W").unwrap().fields[0];
        let decl = generate_field(field, &file).unwrap();
        assert!(decl.lines[0].contains("enum class VKind"));
        assert!(decl.lines[1].contains("VKind v_kind = VKind::none;"));
        assert!(decl.lines[2].contains("V_A as_A"));
        assert!(decl.lines[2].contains("V_B as_B"));
    }

    #[test]
    fn custom_type_default_is_used_when_the_field_has_none_of_its_own() {
        let file = resolve("#define int_ int = 0\nclass Expr (value: int_);");
        let field = &file.node("Expr").unwrap().fields[0];
        let init = generate_initialiser(field, &file).unwrap();
        assert_eq!(init.param, "int value = 0");
    }

    #[test]
    fn map_key_attribute_value_is_used_as_the_key_type() {
        let src = "#define id_ std::string\nclass Stmt;\nclass Scope (names: Stmt<id_>);";
        let file = resolve(src);
        let field = &file.node("Scope").unwrap().fields[0];
        let decl = generate_field(field, &file).unwrap();
        assert_eq!(decl.lines, vec!["std::map<std::string, Stmt*> names;".to_string()]);
    }
}
