//! Semantic analysis: turns a [`astgen_parser::RawFile`] into a fully
//! resolved, validated [`model::ResolvedFile`] (§4.3, §4.4).

pub mod error;
pub mod model;
mod orderer;
mod resolver;

pub use error::{ResolverError, ResolverErrorKind};
pub use model::ResolvedFile;
pub use resolver::resolve;

#[cfg(test)]
mod tests {
    use super::*;
    use astgen_parser::parse;

    fn resolve_src(src: &str) -> ResolvedFile {
        resolve(parse(src).unwrap()).unwrap()
    }

    #[test]
    fn resolves_node_field_to_pointer_access() {
        let file = resolve_src("class Inner; class Outer (child: Inner);");
        let field = &file.node("Outer").unwrap().fields[0];
        assert_eq!(field.model, model::Model::Node);
        assert_eq!(field.access, model::Access::Pointer);
        assert_eq!(field.ownership, model::Ownership::Full);
        assert!(field.is_visitable);
    }

    #[test]
    fn resolves_enum_field_to_object_access() {
        let file = resolve_src("enum Color { Red, Green };\nclass A (c: Color);");
        let field = &file.node("A").unwrap().fields[0];
        assert_eq!(field.model, model::Model::Enum);
        assert_eq!(field.access, model::Access::Object);
        assert!(!field.is_visitable);
    }

    #[test]
    fn pointer_custom_type_gets_pointer_access() {
        let file = resolve_src("#define handle_t void*\nclass A (h: handle_t);");
        let field = &file.node("A").unwrap().fields[0];
        assert_eq!(field.model, model::Model::Type);
        assert_eq!(field.access, model::Access::Pointer);
    }

    #[test]
    fn optional_forces_full_ownership_and_optional_container() {
        let file = resolve_src("class A (x?: int);\n#define int int\n");
        let field = &file.node("A").unwrap().fields[0];
        assert_eq!(field.container, model::Container::Optional);
        assert_eq!(field.ownership, model::Ownership::Full);
    }

    #[test]
    fn reference_forces_non_visitable() {
        let file = resolve_src("class A;\nclass B (a&: A);");
        let field = &file.node("B").unwrap().fields[0];
        assert_eq!(field.ownership, model::Ownership::Reference);
        assert!(!field.is_visitable);
    }

    #[test]
    fn cowned_field_registers_guard_under_default_name() {
        let file = resolve_src("class A;\nclass B ([[cowned]] a: A);");
        let node = file.node("B").unwrap();
        assert_eq!(node.guards.get("_owns_fields"), Some(&vec!["a".to_string()]));
    }

    #[test]
    fn cowned_with_named_guard() {
        let file = resolve_src("class A;\nclass B ([[cowned=my_guard]] a: A);");
        let node = file.node("B").unwrap();
        assert_eq!(node.guards.get("my_guard"), Some(&vec!["a".to_string()]));
    }

    #[test]
    fn rejects_conflicting_decorations() {
        let err = resolve(parse("class A;\nclass B (a?: A[]);").unwrap()).unwrap_err();
        assert!(matches!(
            err.kind,
            ResolverErrorKind::DecorationConflict { .. }
        ));
    }

    #[test]
    fn rejects_aggr_field_with_decoration() {
        let src = "union U { class V (x: int); };\nclass A (u?: U);";
        let err = resolve(parse(src).unwrap()).unwrap_err();
        assert!(matches!(
            err.kind,
            ResolverErrorKind::AggrFieldCannotBeDecorated { .. }
        ));
    }

    #[test]
    fn rejects_unknown_field_type() {
        let err = resolve(parse("class A (x: Bogus);").unwrap()).unwrap_err();
        assert!(matches!(err.kind, ResolverErrorKind::UnknownFieldType { .. }));
    }

    #[test]
    fn rejects_map_key_that_is_not_a_custom_type() {
        let err = resolve(parse("class A;\nclass B (m: A<A>);").unwrap()).unwrap_err();
        assert!(matches!(
            err.kind,
            ResolverErrorKind::MapKeyMustBeCustomType { .. }
        ));
    }

    #[test]
    fn map_key_rewritten_to_underlying_type() {
        let file = resolve_src("#define key_t int\nclass A (m: A<key_t>);");
        let field = &file.node("A").unwrap().fields[0];
        assert_eq!(field.container, model::Container::Map);
        assert_eq!(field.attributes.get("map"), Some(Some("int")));
    }

    #[test]
    fn trait_field_propagates_to_children_and_leaves_parent() {
        let src = "#define int int\nclass Expr ([[istrait]] loc: int); -> class Binary (op: int);";
        let file = resolve_src(src);
        let parent = file.node("Expr").unwrap();
        assert!(!parent.fields.iter().any(|f| f.name == "loc"));
        let child = file.node("Binary").unwrap();
        assert!(child.fields.iter().any(|f| f.name == "loc" && f.attributes.contains("wastrait")));
    }

    #[test]
    fn rejects_node_that_is_both_parent_and_child() {
        // Shape-check catches cases the parser's own attachment-time check
        // can't: a node reused as a subnode elsewhere after already
        // collecting children of its own.
        // B is attached as C's parent while B itself still has no parents
        // (so the parser's own attachment-time check lets it through), and
        // only afterwards does A reach back and claim B as a subnode.
        let src = "class B; -> class C (y: int); class A; -> class B (x: int);";
        let err = resolve(parse(src).unwrap()).unwrap_err();
        assert!(matches!(err.kind, ResolverErrorKind::SubnodeOfSubnode { .. }));
    }

    #[test]
    fn union_variant_rejects_nested_union_field() {
        let src = "#define int int\nunion Inner { class I (x: int); };\nunion Outer { class O (u: Inner); };";
        let err = resolve(parse(src).unwrap()).unwrap_err();
        assert!(matches!(
            err.kind,
            ResolverErrorKind::UnionOfUnionNotAllowed { .. }
        ));
    }

    #[test]
    fn namespace_qualifies_node_and_enum_names() {
        let file = resolve_src("[[namespace=ast]];\nenum E { X };\nclass A;");
        assert_eq!(file.node("A").unwrap().fqn, "ast::A");
        assert_eq!(file.enums.get("E").unwrap().fqn, "ast::E");
    }

    #[test]
    fn declarations_are_ordered_enums_then_parents_then_children() {
        let src = "#define int int\nenum Color { Red };\nclass Expr; -> class Binary (x: int);";
        let file = resolve_src(src);
        assert_eq!(
            file.declarations,
            vec![
                model::DeclRef::Enum("Color".to_string()),
                model::DeclRef::Node("Expr".to_string()),
                model::DeclRef::Node("Binary".to_string()),
            ]
        );
    }
}
