//! Recursive-descent parser producing the raw pre-resolution data model
//! (§3, §4.2).

pub mod error;
pub mod model;
mod parser;

pub use error::{ParserError, ParserErrorKind};
pub use model::RawFile;
pub use parser::Parser;

/// Parse a complete source file into its raw, pre-resolution model.
pub fn parse(source: &str) -> Result<RawFile, ParserError> {
    Parser::new(source)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use astgen_common::decl::DeclKind;

    #[test]
    fn parses_a_single_node_with_fields() {
        let file = parse("class Point (x: int, y: int);").unwrap();
        assert_eq!(file.nodes.len(), 1);
        let node = &file.nodes[0];
        assert_eq!(node.name, "Point");
        assert_eq!(node.fields.len(), 2);
        assert_eq!(node.fields[0].name, "x");
        assert_eq!(node.fields[0].type_name, "int");
    }

    #[test]
    fn merges_a_redeclared_node() {
        let file = parse("class Point (x: int); class Point (y: int);").unwrap();
        assert_eq!(file.nodes.len(), 1);
        assert_eq!(file.nodes[0].fields.len(), 2);
    }

    #[test]
    fn parses_subnode_chain_and_reciprocal_links() {
        let file = parse("class Expr (op: int); -> class Binary (lhs: int);").unwrap();
        assert_eq!(file.nodes.len(), 2);
        let parent = file.node("Expr").unwrap();
        assert_eq!(parent.children, vec!["Binary".to_string()]);
        let child = file.node("Binary").unwrap();
        assert_eq!(child.parents, vec!["Expr".to_string()]);
    }

    #[test]
    fn sibling_subnodes_share_one_parent() {
        // All `subnode*` entries following a node attach to *that* node
        // (siblings), not to one another -- this is not a rejection case.
        let file = parse("class A (x: int); -> class B (y: int); -> class C (z: int);").unwrap();
        let parent = file.node("A").unwrap();
        assert_eq!(parent.children, vec!["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn rejects_subnode_of_subnode() {
        let src = "class A; -> class B (x: int); class B (y: int); -> class C (z: int);";
        let err = parse(src).unwrap_err();
        assert!(matches!(err.kind, ParserErrorKind::SubnodeParentOfSubnode { .. }));
    }

    #[test]
    fn field_decoration_shorthand_sets_attributes() {
        let file = parse("class N (a?: int, b&: int, c: int[], d: int[][], e: int<Key>, f: int{Key});")
            .unwrap();
        let fields = &file.node("N").unwrap().fields;
        assert!(fields[0].attributes.contains("optional"));
        assert!(fields[1].attributes.contains("reference"));
        assert!(fields[2].attributes.contains("array"));
        assert!(fields[3].attributes.contains("darray"));
        assert_eq!(fields[4].attributes.get("map"), Some(Some("Key")));
        assert_eq!(fields[5].attributes.get("mmap"), Some(Some("Key")));
    }

    #[test]
    fn shared_names_produce_one_field_per_name() {
        let file = parse("class N (a, b, c: int);").unwrap();
        let fields = &file.node("N").unwrap().fields;
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "a");
        assert_eq!(fields[1].name, "b");
        assert_eq!(fields[2].name, "c");
        assert!(fields.iter().all(|f| f.type_name == "int"));
    }

    #[test]
    fn two_separate_fields_with_own_types() {
        let file = parse("class N (a: int, b: float);").unwrap();
        let fields = &file.node("N").unwrap().fields;
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].type_name, "int");
        assert_eq!(fields[1].type_name, "float");
    }

    #[test]
    fn default_value_stops_at_comma() {
        let file = parse("class N (a: int = 0, b: int = 1);").unwrap();
        let fields = &file.node("N").unwrap().fields;
        assert_eq!(fields[0].default.as_deref(), Some("0"));
        assert_eq!(fields[1].default.as_deref(), Some("1"));
    }

    #[test]
    fn parses_enum_declaration() {
        let file = parse("enum Color { Red, Green, Blue };").unwrap();
        assert_eq!(file.enums.len(), 1);
        assert_eq!(file.enums[0].variants, vec!["Red", "Green", "Blue"]);
    }

    #[test]
    fn parses_union_with_brace_variants() {
        let file = parse("union Shape { class Circle (r: int); class Square (s: int); };").unwrap();
        assert_eq!(file.unions.len(), 1);
        let u = &file.unions[0];
        assert_eq!(u.variants.len(), 2);
        assert!(u.has_variant("Circle"));
        assert!(u.has_variant("Square"));
    }

    #[test]
    fn parses_union_with_bare_single_variant() {
        let file = parse("union Shape Circle (r: int);").unwrap();
        assert_eq!(file.unions[0].variants.len(), 1);
    }

    #[test]
    fn parses_define_with_default() {
        let file = parse("#define int_ int = 0\n").unwrap();
        assert_eq!(file.types.len(), 1);
        let t = &file.types[0];
        assert_eq!(t.name, "int_");
        assert_eq!(t.underlying, "int");
        assert_eq!(t.default.as_deref(), Some("0"));
    }

    #[test]
    fn parses_define_without_default() {
        let file = parse("#define handle_t void*\n").unwrap();
        let t = &file.types[0];
        assert_eq!(t.underlying, "void*");
        assert!(t.default.is_none());
        assert!(t.is_pointer());
    }

    #[test]
    fn parses_include_directive() {
        let file = parse("#include \"foo.h\"\nclass A;").unwrap();
        assert_eq!(file.includes, vec!["\"foo.h\"".to_string()]);
    }

    #[test]
    fn parses_file_attributes() {
        let file = parse("[[namespace=ast]];\nclass A;").unwrap();
        assert_eq!(file.options.get("namespace"), Some(Some("ast")));
    }

    #[test]
    fn parses_node_attributes_and_custom_code() {
        let file = parse(
            "[[visitable]] class A (x: int) PUBLIC: { int helper() { return 1; } } { int priv; };",
        )
        .unwrap();
        let node = &file.nodes[0];
        assert!(node.attributes.contains("visitable"));
        assert_eq!(node.public_blocks.len(), 1);
        assert!(node.public_blocks[0].code.contains("helper"));
        assert_eq!(node.private_blocks.len(), 1);
    }

    #[test]
    fn rejects_field_redefinition() {
        let err = parse("class A (x: int, x: float);").unwrap_err();
        assert!(matches!(err.kind, ParserErrorKind::FieldRedefined { .. }));
    }

    #[test]
    fn rejects_unknown_attribute() {
        let err = parse("[[bogus]] class A;").unwrap_err();
        assert!(matches!(err.kind, ParserErrorKind::UnknownAttribute { .. }));
    }

    #[test]
    fn rejects_name_collision_across_tables() {
        let err = parse("enum A { X };\nclass A;").unwrap_err();
        match err.kind {
            ParserErrorKind::NameAlreadyDefines { name, kind } => {
                assert_eq!(name, "A");
                assert_eq!(kind, DeclKind::Enum);
            }
            other => panic!("expected NameAlreadyDefines, got {other:?}"),
        }
    }
}
