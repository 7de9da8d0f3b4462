// End-to-end export passes over small scripts

use std::sync::Arc;

use rsreflect_ast::{BinaryOp, BuiltinKind, Expr, FieldDecl, Qualifiers, TypeArena, VarDecl};
use rsreflect_diagnostics::{error_codes, ErrorLevel, Span};
use rsreflect_export::{
    ConsistencyMode, ConstantEvaluator, ConstantValue, DataKind, DataType, ElementInfo,
    ElementRegistry, EvalError, ExportConfig, ExportContext, ExportType,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const SCRIPT: &str = "#pragma version(1)\n\
                      #pragma java_package_name(\"com.example.blur\")\n\
                      \n\
                      rs_pixel_rgba gTint;\n";

#[test]
fn test_process_vars_skips_failures() {
    init_logger();
    let arena = TypeArena::new();
    let uchar4 = arena.ext_vector(arena.builtin(BuiltinKind::UChar), 4);
    let rgba = arena.typedef("rs_pixel_rgba", uchar4);
    let int = arena.builtin(BuiltinKind::Int);
    let function = arena.function(int, vec![int]);

    let decls = vec![
        VarDecl::new("gTint", rgba).with_init(Expr::InitList(vec![
            Expr::IntLiteral(255),
            Expr::IntLiteral(128),
        ])),
        VarDecl::new("kRadius", int)
            .with_qualifiers(Qualifiers::constant())
            .with_init(Expr::binary(BinaryOp::Mul, Expr::IntLiteral(4), Expr::IntLiteral(2))),
        VarDecl::new("gCallback", arena.pointer(function))
            .with_span(Span::new("blur.rs".to_string(), 7, 8, 9)),
        VarDecl::new("rsInternal", int),
        VarDecl::new("kBroken", int).with_qualifiers(Qualifiers::constant()),
    ];

    let mut context = ExportContext::new(ExportConfig::default());
    let summary = context.process_vars(&decls);

    assert_eq!(summary.exported, 2);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.internal_faults, 0);
    assert!(!summary.is_clean());

    let tint = &context.vars()[0];
    assert_eq!(tint.export_type().data_kind(), Some(DataKind::PixelRGBA));
    assert_eq!(
        tint.init(),
        &ConstantValue::Vector(vec![
            ConstantValue::Int(255),
            ConstantValue::Int(128),
            ConstantValue::Int(0),
            ConstantValue::Int(0),
        ])
    );

    let radius = &context.vars()[1];
    assert!(radius.is_const());
    assert_eq!(radius.init(), &ConstantValue::Int(8));

    let codes: Vec<_> = context
        .diagnostics()
        .diagnostics()
        .iter()
        .map(|d| d.code.as_str())
        .collect();
    assert_eq!(
        codes,
        vec![
            error_codes::UNSUPPORTED_TYPE,
            error_codes::RESERVED_NAME,
            error_codes::MISSING_INITIALIZER,
        ]
    );
    assert_eq!(context.diagnostics().diagnostics()[0].span.line, 7);
}

#[test]
fn test_equal_types_are_shared() {
    init_logger();
    let arena = TypeArena::new();
    let float = arena.builtin(BuiltinKind::Float);
    let scale_t = arena.typedef("scale_t", float);

    let mut context = ExportContext::new(ExportConfig::default());
    let summary = context.process_vars(&[VarDecl::new("gScale", float), VarDecl::new("gGain", scale_t)]);
    assert!(summary.is_clean());

    let vars = context.vars();
    assert!(Arc::ptr_eq(vars[0].shared_type(), vars[1].shared_type()));
    assert_eq!(context.interner().len(), 1);
}

#[test]
fn test_pragmas_and_package_name() {
    init_logger();
    let mut context = ExportContext::new(ExportConfig::default());
    assert_eq!(context.scan_pragmas(SCRIPT), 2);

    let options = context.reflection_options();
    assert_eq!(options.version, Some(1));
    assert_eq!(context.package_name().as_deref(), Some("com.example.blur"));

    let explicit = ExportContext::new(ExportConfig {
        package_name: Some("com.example.override".to_string()),
        ..ExportConfig::default()
    });
    assert_eq!(explicit.package_name().as_deref(), Some("com.example.override"));
}

#[test]
fn test_misspelled_element_gets_a_suggestion() {
    init_logger();
    let arena = TypeArena::new();
    let uchar3 = arena.ext_vector(arena.builtin(BuiltinKind::UChar), 3);
    let decl = VarDecl::new("gColor", arena.typedef("rs_pixel_rbg", uchar3));

    let mut context = ExportContext::new(ExportConfig::default());
    let ty = context.export_type(&decl).unwrap();
    assert_eq!(ty.data_kind(), Some(DataKind::User));

    let warning = &context.diagnostics().diagnostics()[0];
    assert_eq!(warning.level, ErrorLevel::Warning);
    assert_eq!(warning.code, error_codes::UNKNOWN_ELEMENT_NAME);
    assert!(warning.help.iter().any(|h| h.contains("rs_pixel_rgb")));
}

#[test]
fn test_field_of_record_goes_through_element_path() {
    init_logger();
    let arena = TypeArena::new();
    let uchar = arena.builtin(BuiltinKind::UChar);
    let alpha = arena.typedef("rs_pixel_a", uchar);
    let sample = arena.struct_type(
        "Sample",
        vec![FieldDecl::new("alpha", alpha), FieldDecl::new("weight", arena.builtin(BuiltinKind::Float))],
    );

    let mut context = ExportContext::new(ExportConfig::default());
    let ty = context.export_type(&FieldDecl::new("gSample", sample)).unwrap();
    let ExportType::Record(record) = ty.as_ref() else {
        panic!("expected a record");
    };
    assert_eq!(record.fields[0].ty.data_kind(), Some(DataKind::PixelA));
    assert_eq!(record.fields[1].ty.data_type(), Some(DataType::Float32));
}

#[test]
fn test_table_mismatch_is_reported_as_bug() {
    init_logger();
    let registry: &'static ElementRegistry = Box::leak(Box::new(ElementRegistry::from_table(&[(
        "odd_pixel",
        ElementInfo::new(DataKind::PixelRGB, DataType::Unsigned16, true, 1),
    )])));
    let arena = TypeArena::new();
    let decl = VarDecl::new("gOdd", arena.typedef("odd_pixel", arena.builtin(BuiltinKind::UChar)));

    let config = ExportConfig {
        consistency: ConsistencyMode::Strict,
        ..ExportConfig::default()
    };
    let mut context = ExportContext::with_registry(config, registry);
    let summary = context.process_vars(std::slice::from_ref(&decl));

    assert_eq!(summary.internal_faults, 1);
    assert!(context.diagnostics().has_bugs());

    let lenient = ExportConfig {
        consistency: ConsistencyMode::Warn,
        ..ExportConfig::default()
    };
    let mut context = ExportContext::with_registry(lenient, registry);
    assert!(context.process_vars(&[decl]).is_clean());
}

struct RejectingEvaluator;

impl ConstantEvaluator for RejectingEvaluator {
    fn evaluate(&self, _expr: &Expr) -> Result<ConstantValue, EvalError> {
        Err(EvalError::NotConstant {
            what: "expression".to_string(),
        })
    }
}

#[test]
fn test_custom_evaluator() {
    init_logger();
    let arena = TypeArena::new();
    let int = arena.builtin(BuiltinKind::Int);
    let decls = [
        VarDecl::new("gLoose", int).with_init(Expr::IntLiteral(1)),
        VarDecl::new("kStrict", int)
            .with_qualifiers(Qualifiers::constant())
            .with_init(Expr::IntLiteral(1)),
    ];

    let mut context = ExportContext::new(ExportConfig::default()).with_evaluator(RejectingEvaluator);
    let summary = context.process_vars(&decls);

    assert_eq!(summary.exported, 1);
    assert!(context.vars()[0].init().is_uninit());
    assert_eq!(
        context.diagnostics().diagnostics()[0].code,
        error_codes::CONSTANT_EVALUATION
    );
}

#[test]
fn test_defined_macros_reach_pragma_values() {
    init_logger();
    let source = "#pragma java_package_name(PKG)\n";

    let mut context = ExportContext::new(ExportConfig::default());
    context.define_macro("PKG", "com example");
    assert_eq!(context.scan_pragmas(source), 0);

    let mut context = ExportContext::new(ExportConfig::default());
    context.define_macro("PKG", "\"com.example\"");
    assert_eq!(context.scan_pragmas(source), 1);
    assert_eq!(context.package_name().as_deref(), Some("PKG"));
}
