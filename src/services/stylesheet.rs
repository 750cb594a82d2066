//! Stylesheet processor backends.
//!
//! The transformation engine owns XML handling; executing the stylesheet
//! program itself is delegated to a `StylesheetProcessor`:
//! - libxslt - feature `libxslt`, on by default
//! - unavailable - fallback for builds without it, rejects every transform

use std::sync::Arc;

use crate::infra::error::{SigningError, SigningResult};

/// Executes a stylesheet program against a well-formed XML source.
#[cfg_attr(test, mockall::automock)]
pub trait StylesheetProcessor: Send + Sync {
    /// Apply `stylesheet` to `source` and return the serialized result.
    ///
    /// # Errors
    ///
    /// Returns `TransformationError` if the stylesheet is invalid or the
    /// transformation fails.
    fn transform(&self, source: &[u8], stylesheet: &str) -> SigningResult<String>;
}

/// The best processor compiled into this build.
#[must_use]
pub fn default_processor() -> Arc<dyn StylesheetProcessor> {
    #[cfg(feature = "libxslt")]
    {
        log::debug!("Using libxslt stylesheet processor");
        Arc::new(libxslt_backend::LibxsltProcessor)
    }

    #[cfg(not(feature = "libxslt"))]
    {
        log::debug!("No stylesheet processor compiled in");
        Arc::new(UnavailableProcessor)
    }
}

/// Processor used when no backend feature is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableProcessor;

impl StylesheetProcessor for UnavailableProcessor {
    fn transform(&self, _source: &[u8], _stylesheet: &str) -> SigningResult<String> {
        Err(SigningError::TransformationError(
            "No stylesheet processor available. Enable the 'libxslt' feature.".to_string(),
        ))
    }
}

#[cfg(feature = "libxslt")]
mod libxslt_backend {
    use std::ffi::{c_char, c_int, c_void};
    use std::ptr;

    use libxml::parser::Parser;
    use libxslt::bindings::{
        xmlChar, xmlDocPtr, xmlFree, xmlFreeDoc, xmlReadMemory, xsltApplyStylesheet,
        xsltFreeStylesheet, xsltParseStylesheetDoc, xsltSaveResultToString, xsltStylesheetPtr,
    };

    use super::StylesheetProcessor;
    use crate::infra::error::{SigningError, SigningResult};

    /// libxslt-backed XSLT 1.0 processor. The result is serialized the way
    /// the stylesheet's `xsl:output` asks for (text, html or xml).
    pub struct LibxsltProcessor;

    struct Stylesheet(xsltStylesheetPtr);

    impl Drop for Stylesheet {
        fn drop(&mut self) {
            // SAFETY: the pointer came from xsltParseStylesheetDoc and is freed once.
            unsafe { xsltFreeStylesheet(self.0) }
        }
    }

    struct ResultDocument(xmlDocPtr);

    impl Drop for ResultDocument {
        fn drop(&mut self) {
            // SAFETY: the result document is owned here and freed once.
            unsafe { xmlFreeDoc(self.0) }
        }
    }

    fn failure(message: impl Into<String>) -> SigningError {
        SigningError::TransformationError(message.into())
    }

    fn compile(stylesheet: &str) -> SigningResult<Stylesheet> {
        libxslt::register_exslt();
        let len = c_int::try_from(stylesheet.len())
            .map_err(|_| failure("Stylesheet is too large"))?;

        // SAFETY: buffer and length describe `stylesheet`; the URL is NUL-terminated.
        let doc = unsafe {
            xmlReadMemory(
                stylesheet.as_ptr().cast::<c_char>(),
                len,
                b"preview.xsl\0".as_ptr().cast::<c_char>(),
                ptr::null(),
                0,
            )
        };
        if doc.is_null() {
            return Err(failure("Invalid stylesheet: not well-formed XML"));
        }

        // SAFETY: on success the stylesheet takes ownership of `doc`; on
        // failure `doc` is still ours to free.
        let style = unsafe { xsltParseStylesheetDoc(doc) };
        if style.is_null() {
            unsafe { xmlFreeDoc(doc) };
            return Err(failure("Invalid stylesheet: not an XSLT program"));
        }
        Ok(Stylesheet(style))
    }

    fn serialize(result: &ResultDocument, style: &Stylesheet) -> SigningResult<String> {
        let mut text: *mut xmlChar = ptr::null_mut();
        let mut len: c_int = 0;

        // SAFETY: both documents are live; libxslt allocates `text` with xmlMalloc.
        let status = unsafe { xsltSaveResultToString(&mut text, &mut len, result.0, style.0) };
        if status != 0 {
            return Err(failure("Failed to serialize transformation result"));
        }
        if text.is_null() {
            return Ok(String::new());
        }

        let len = usize::try_from(len).unwrap_or_default();
        // SAFETY: libxslt wrote `len` bytes at `text`, released right after the copy.
        let bytes = unsafe { std::slice::from_raw_parts(text, len) }.to_vec();
        unsafe {
            if let Some(free) = xmlFree {
                free(text.cast::<c_void>());
            }
        }

        String::from_utf8(bytes)
            .map_err(|_| failure("Transformation output is not UTF-8; check xsl:output encoding"))
    }

    impl StylesheetProcessor for LibxsltProcessor {
        fn transform(&self, source: &[u8], stylesheet: &str) -> SigningResult<String> {
            let source = Parser::default()
                .parse_string(source)
                .map_err(|e| failure(format!("Failed to parse document: {e:?}")))?;
            let style = compile(stylesheet)?;

            // SAFETY: stylesheet and source are live for the call; the result
            // document is owned by the guard.
            let result = ResultDocument(unsafe {
                xsltApplyStylesheet(style.0, source.doc_ptr(), ptr::null_mut())
            });
            if result.0.is_null() {
                return Err(failure("Transformation failed"));
            }

            serialize(&result, &style)
        }
    }

}

#[cfg(all(test, not(feature = "libxslt")))]
mod tests {
    use super::*;

    #[test]
    fn test_default_processor_without_backend() {
        let processor = default_processor();
        let err = processor.transform(b"<a/>", "<xsl/>").unwrap_err();
        assert!(matches!(err, SigningError::TransformationError(msg) if msg.contains("libxslt")));
    }
}
