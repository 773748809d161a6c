//! Entry points that run the whole pipeline on source text.

use alloc::vec::Vec;

use crate::diagnostic::Diagnostic;
use crate::error::CoreError;
use crate::exact_value::ExactValue;
use crate::fold::{Constant, Folder};
use crate::parser::{parse, parse_expression};
use crate::span::FileId;

#[derive(Debug, Clone, PartialEq)]
pub struct FoldArtifact {
    /// Folded constants in declaration order.
    pub constants: Vec<Constant>,
    pub warnings: Vec<Diagnostic>,
}

impl FoldArtifact {
    pub fn get(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|constant| constant.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoldedExpression {
    pub value: ExactValue,
    pub warnings: Vec<Diagnostic>,
}

/// Folds every declaration in `source`.
///
/// Fails with [`CoreError::Diagnostics`] carrying every diagnostic,
/// warnings included, if any error was reported.
pub fn fold_source(source: &str) -> Result<FoldArtifact, CoreError> {
    fold_sources([source])
}

/// Folds several sources in order with one shared set of constants, so
/// later sources can refer to constants of earlier ones. Each source
/// gets the [`FileId`] of its position.
pub fn fold_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> Result<FoldArtifact, CoreError> {
    let mut folder = Folder::new();
    for (index, source) in sources.into_iter().enumerate() {
        let parsed = parse(FileId(index as u32), source);
        folder.report(parsed.diagnostics);
        folder.fold_file(&parsed.file);
    }
    let has_errors = folder.has_errors();
    let (constants, diagnostics) = folder.finish();
    if has_errors {
        return Err(CoreError::Diagnostics(diagnostics));
    }
    Ok(FoldArtifact {
        constants,
        warnings: diagnostics,
    })
}

/// Folds a single expression.
pub fn fold_expression(source: &str) -> Result<FoldedExpression, CoreError> {
    let parsed = parse_expression(FileId(0), source);
    let mut folder = Folder::new();
    folder.report(parsed.diagnostics);
    let value = match &parsed.expr {
        Some(expr) if !folder.has_errors() => folder.evaluate(expr),
        _ => None,
    };
    let (_, diagnostics) = folder.finish();
    match value {
        Some(value) if !diagnostics.iter().any(Diagnostic::is_error) => Ok(FoldedExpression {
            value,
            warnings: diagnostics,
        }),
        _ => Err(CoreError::Diagnostics(diagnostics)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::big_int::BigInt;
    use crate::types::IntType;

    #[test]
    fn folds_a_source_file() {
        let artifact = fold_source("A : u16 : 0xffff\nB :: add A 1 // wider than u16\n")
            .expect("fold");
        assert_eq!(artifact.constants.len(), 2);
        assert_eq!(artifact.get("A").map(|constant| constant.ty), Some(IntType::U16));
        assert_eq!(
            artifact.get("B").map(|constant| constant.value.clone()),
            Some(ExactValue::Integer(BigInt::from(0x1_0000)))
        );
        assert!(artifact.warnings.is_empty());
    }

    #[test]
    fn collects_every_error() {
        let err = fold_source("A :: quo 4 0\nB :: $\nC : u8 : 256").unwrap_err();
        let codes: Vec<_> = err.diagnostics().iter().filter_map(|diag| diag.code).collect();
        assert_eq!(codes, ["E0001", "E0101", "E0301", "E0302"]);
        assert_eq!(err.to_string(), "constant folding failed with 4 error(s)");
    }

    #[test]
    fn later_sources_see_earlier_constants() {
        let artifact = fold_sources(["BASE :: 10", "KILO :: pow BASE 3"]).expect("fold");
        assert_eq!(
            artifact.get("KILO").map(|constant| constant.value.clone()),
            Some(ExactValue::Integer(BigInt::from(1000)))
        );

        let err = fold_sources(["A :: 1", "B :: quo A 0"]).unwrap_err();
        assert_eq!(err.diagnostics()[0].span.file_id, FileId(1));
    }

    #[test]
    fn folds_expressions() {
        let folded = fold_expression("mul 0xffff_ffff_ffff_ffff 0xffff_ffff_ffff_ffff")
            .expect("fold");
        assert_eq!(
            folded.value.to_text_in_base(16),
            "0xfffffffffffffffe0000000000000001"
        );

        let folded = fold_expression("div 1 4").expect("fold");
        assert_eq!(folded.value, ExactValue::Float(0.25));
        assert_eq!(folded.warnings.len(), 1);

        let err = fold_expression("quo 1 0").unwrap_err();
        assert_eq!(err.diagnostics()[0].code, Some("E0301"));
        assert!(fold_expression("UNKNOWN").is_err());
        assert!(fold_expression("add 1").is_err());
    }
}
