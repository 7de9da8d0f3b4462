// Registry and alias chain properties over the compiled-in element table

use rsreflect_ast::{BuiltinKind, TypeArena, TypeRef, VarDecl};
use rsreflect_export::element_registry::{lookup, ELEMENT_TABLE};
use rsreflect_export::{ConsistencyMode, ElementRegistry, ExportType, TypeResolver};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Declares every table entry the way the runtime headers do
fn element_type<'a>(arena: &'a TypeArena<'a>, name: &str) -> TypeRef<'a> {
    let info = lookup(name).unwrap();
    let base = match info.data_type {
        rsreflect_export::DataType::Unsigned8 => arena.builtin(BuiltinKind::UChar),
        _ => arena.builtin(BuiltinKind::UShort),
    };
    let underlying = if info.vector_size > 1 {
        arena.ext_vector(base, info.vector_size)
    } else {
        base
    };
    arena.typedef(name, underlying)
}

#[test]
fn test_lookup_is_stable_across_initialize_calls() {
    init_logger();
    let before: Vec<_> = ELEMENT_TABLE
        .iter()
        .map(|(name, _)| lookup(name).unwrap())
        .collect();

    ElementRegistry::initialize();
    ElementRegistry::initialize();

    for ((name, expected), seen) in ELEMENT_TABLE.iter().zip(before) {
        assert_eq!(lookup(name), Some(*expected));
        assert_eq!(seen, *expected);
    }
}

#[test]
fn test_vector_size_decides_variant() {
    init_logger();
    let arena = TypeArena::new();
    let mut resolver = TypeResolver::with_global_registry(ConsistencyMode::Strict);

    for (name, info) in ELEMENT_TABLE {
        let decl = VarDecl::new("gValue", element_type(&arena, name));
        let export = resolver.resolve_declaration(&decl).unwrap();

        match &export {
            ExportType::Primitive(_) => assert_eq!(info.vector_size, 1, "{}", name),
            ExportType::Vector(vector) => {
                assert!(info.vector_size > 1, "{}", name);
                assert_eq!(vector.size, info.vector_size);
            }
            other => panic!("{} resolved to {:?}", name, other),
        }
        assert_eq!(export.data_type(), Some(info.data_type));
        assert_eq!(export.data_kind(), Some(info.kind));
    }
}

#[test]
fn test_first_match_on_the_alias_chain_wins() {
    init_logger();
    let arena = TypeArena::new();
    let uchar = arena.builtin(BuiltinKind::UChar);
    // typedef uchar rs_pixel_l; typedef rs_pixel_l rs_pixel_a; typedef rs_pixel_a mask_t;
    let luminance = arena.typedef("rs_pixel_l", uchar);
    let alpha = arena.typedef("rs_pixel_a", luminance);
    let mask = arena.typedef("mask_t", alpha);

    let mut resolver = TypeResolver::with_global_registry(ConsistencyMode::Strict);
    let export = resolver
        .resolve_declaration(&VarDecl::new("gMask", mask))
        .unwrap();

    assert_eq!(export.name(), "rs_pixel_a");
    assert_eq!(
        export.data_kind(),
        Some(rsreflect_export::DataKind::PixelA)
    );
}

#[test]
fn test_long_chain_without_element_terminates() {
    init_logger();
    let arena = TypeArena::new();
    let mut ty = arena.builtin(BuiltinKind::Float);
    for depth in 0..64 {
        ty = arena.typedef(&format!("level{}_t", depth), ty);
    }

    let chain_len = ty.alias_chain().count();
    assert_eq!(chain_len, 64);

    let mut resolver = TypeResolver::with_global_registry(ConsistencyMode::Strict);
    let export = resolver.resolve_declaration(&VarDecl::new("gDeep", ty)).unwrap();
    assert_eq!(export.name(), "float");
}

#[test]
fn test_element_name_behind_pointer_is_not_an_element() {
    init_logger();
    let arena = TypeArena::new();
    let pixel = element_type(&arena, "rs_pixel_rgba");
    let decl = VarDecl::new("gPixels", arena.typedef("pixels_t", arena.pointer(pixel)));

    let mut resolver = TypeResolver::with_global_registry(ConsistencyMode::Strict);
    assert!(resolver.find_element(decl.ty).is_none());

    let export = resolver.resolve_declaration(&decl).unwrap();
    let ExportType::Pointer(pointer) = export else {
        panic!("expected a pointer");
    };
    // Pointees are resolved through their canonical form
    assert_eq!(pointer.name, "uchar4*");
    assert_eq!(pointer.pointee.vector_size(), Some(4));
}
