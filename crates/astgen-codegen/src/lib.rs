//! Code generation: the dispatch-table contract (§4.5) and the four
//! concrete backends built on top of it.

pub mod backends;
mod dispatch;
pub mod error;
mod framework;
mod shapes;

pub use dispatch::dispatch_key;
pub use error::GenerationError;
pub use framework::Generator;

#[cfg(test)]
mod tests {
    use super::*;
    use astgen_parser::parse;
    use astgen_resolve::resolve;

    fn resolved(src: &str) -> astgen_resolve::ResolvedFile {
        resolve(parse(src).unwrap()).unwrap()
    }

    #[test]
    fn s1_leaf_node_with_default_scalar() {
        let file = resolved("#define int_ int = 0\nclass Expr (value: int_);");
        let header = backends::nodes_header::generate(&file, "ast").unwrap();
        assert!(header.contains("class Expr {"));
        assert!(header.contains("int value;"));
        let impl_text = backends::nodes_impl::generate(&file, "ast").unwrap();
        assert!(impl_text.contains("Expr::Expr(int value = 0)"));
        assert!(impl_text.contains("Expr::~Expr() {\n}"));
    }

    #[test]
    fn s2_one_level_polymorphism() {
        let file = resolved("class Stmt;\n-> class Assign (lhs:Stmt, rhs:Stmt);");
        let header = backends::nodes_header::generate(&file, "ast").unwrap();
        assert!(header.contains("virtual const char* get_kind() const = 0;"));
        assert!(header.contains("virtual bool is_Assign() const { return false; }"));
        assert!(header.contains("class Assign : public Stmt {"));
        let impl_text = backends::nodes_impl::generate(&file, "ast").unwrap();
        assert!(impl_text.contains("Assign::~Assign() {\n    delete lhs;\n    delete rhs;\n}"));
        assert!(impl_text.contains("bool Assign::is_Assign() const { return true; }"));
    }

    #[test]
    fn s4_conditionally_owned_guard() {
        let file = resolved("class Stmt;\nclass Y ([[cowned]] t:Stmt);");
        let header = backends::nodes_header::generate(&file, "ast").unwrap();
        assert!(header.contains("bool _owns_fields = false;"));
        let impl_text = backends::nodes_impl::generate(&file, "ast").unwrap();
        assert!(impl_text.contains("if (_owns_fields) {\n        delete t;\n    }"));
    }

    #[test]
    fn s5_union_discriminator_and_setter() {
        let src = "union V { class A (x:int_); class B (y:int_); };\n#define int_ int\nclass W (v:V);";
        let file = resolved(src);
        let header = backends::nodes_header::generate(&file, "ast").unwrap();
        assert!(header.contains("struct V_A {"));
        assert!(header.contains("enum class VKind { none, A, B };"));
        assert!(header.contains("void set_v_kind(const V_A& value);"));
        let impl_text = backends::nodes_impl::generate(&file, "ast").unwrap();
        assert!(impl_text.contains("void W::set_v_kind(const V_A& value) {"));
        assert!(impl_text.contains("new (&v_storage.as_A) V_A(value);"));
    }

    #[test]
    fn s6_map_with_custom_key() {
        let src = "#define id_ std::string\nclass Stmt;\nclass Scope (names:Stmt<id_>);";
        let file = resolved(src);
        let header = backends::nodes_header::generate(&file, "ast").unwrap();
        assert!(header.contains("std::map<std::string, Stmt*> names;"));
    }

    #[test]
    fn debug_backend_refused_without_visitable_option() {
        let file = resolved("class A;");
        let err = backends::debug_header::generate(&file, "ast").unwrap_err();
        assert_eq!(err, GenerationError::AstNotVisitable);
    }

    #[test]
    fn debug_backend_allowed_with_visitable_option() {
        let file = resolved("[[visitable]];\nclass A (x: int_);\n#define int_ int\n");
        let header = backends::debug_header::generate(&file, "ast").unwrap();
        assert!(header.contains("class DebugPrinter : public Visitor {"));
        let impl_text = backends::debug_impl::generate(&file, "ast").unwrap();
        assert!(impl_text.contains("bool DebugPrinter::visit(A* node) {"));
    }
}
