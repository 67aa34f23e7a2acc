//! Property tests for output name derivation.

use pdf2word::output_name;
use proptest::prelude::*;

proptest! {
    /// Whatever the client sends as a filename, the result is a bare
    /// `.docx` name.
    #[test]
    fn output_name_is_bare_docx(name in "[a-zA-Z0-9 ._/\\\\-]{0,40}") {
        let out = output_name(&name, "docx");
        prop_assert!(out.ends_with(".docx"), "{:?} -> {:?}", name, out);
        prop_assert!(!out.contains('/') && !out.contains('\\'), "{:?} -> {:?}", name, out);
        prop_assert!(out.len() > ".docx".len(), "{:?} -> {:?}", name, out);
    }

    /// A `.pdf` name keeps its stem.
    #[test]
    fn pdf_stem_is_preserved(stem in "[a-zA-Z0-9_-]{1,20}") {
        let out = output_name(&format!("{stem}.pdf"), "docx");
        prop_assert_eq!(out, format!("{stem}.docx"));
    }
}
