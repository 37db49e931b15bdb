//! The shared `sod_common.h` and the umbrella `sod.h`.
//!
//! The common header is assembled from fixed registry material plus two
//! things recovered from the source: the required constant macros and the
//! common enumeration definitions. Every other header includes it first.

use sodsplit_core::registry::{
    API_EXPORT_MACRO, COMMON_ENUMS, COMMON_TYPES, REQUIRED_CONSTANTS, REQUIRED_TYPEDEFS,
    STANDARD_HEADERS,
};
use sodsplit_extract::{ElementPatterns, Extraction};

/// Build the complete `sod_common.h` text.
pub(crate) fn common_header(extraction: &Extraction, patterns: &ElementPatterns) -> String {
    let mut header = String::from(
        "\n/* \n * sod_common.h - Common definitions for the SOD library\n * Generated from the original monolithic code\n */\n\n#ifndef SOD_COMMON_H__\n#define SOD_COMMON_H__\n\n/* Standard includes */\n",
    );

    for include in STANDARD_HEADERS {
        header.push_str(&format!("#include {}\n", include));
    }

    header.push_str(
        "\n/* Platform-specific includes */\n#if defined(_WIN32) || defined(_MSC_VER)\n#define __WINNT__ 1\n#include <windows.h>\n#elif defined(__APPLE__) || defined(__linux__) || defined(__unix__)\n#define __UNIXES__ 1\n#include <unistd.h>\n#include <sys/types.h>\n#endif\n\n/* Define PATH_MAX if not already defined */\n#ifndef PATH_MAX\n#ifdef _WIN32\n#define PATH_MAX 260\n#else\n#define PATH_MAX 4096\n#endif\n#endif\n\n",
    );

    header.push_str(&format!("\n{}\n", API_EXPORT_MACRO));
    header.push_str(&format!("\n{}\n", REQUIRED_TYPEDEFS));

    header.push_str("\n/* Required constants */\n");
    for constant in REQUIRED_CONSTANTS {
        for mac in &extraction.macros {
            if mac.name == *constant {
                header.push_str(&mac.content);
                header.push('\n');
                break;
            }
        }
    }

    header.push_str("\n/* Forward declarations for common types */\n");
    for type_name in COMMON_TYPES {
        header.push_str(&format!("typedef struct {} {};\n", type_name, type_name));
    }

    header.push_str("\n/* Common enumerations */\n");
    for enm in &extraction.enums {
        if COMMON_ENUMS.contains(&enm.name.as_str()) {
            // scrub stray tail artifacts the extraction may carry along
            let cleaned = patterns.enum_tail_e.replace_all(&enm.content, "} ${1};");
            let cleaned = patterns.enum_tail_junk.replace_all(&cleaned, "} ${1};");
            header.push_str(&cleaned);
            header.push_str("\n\n");
        }
    }

    header.push_str("\n#endif /* SOD_COMMON_H__ */\n");
    header
}

/// Build the umbrella `sod.h` listing every emitted module header.
pub(crate) fn umbrella(modules: &[&str]) -> String {
    let mut header = String::from(
        "\n/* \n * sod.h - Main header file for the SOD library\n * Generated from the original monolithic code\n */\n\n#ifndef SOD_H__\n#define SOD_H__\n\n/* Include all component headers */\n#include \"sod/sod_common.h\"\n",
    );

    let mut sorted: Vec<&str> = modules.to_vec();
    sorted.sort_unstable();
    for module in sorted {
        if module != "common" {
            header.push_str(&format!("#include \"sod/sod_{}.h\"\n", module));
        }
    }

    header.push_str("\n#endif /* SOD_H__ */\n");
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use sodsplit_core::{Element, ElementKind};

    fn extraction_with(macros: Vec<Element>, enums: Vec<Element>) -> Extraction {
        Extraction { macros, enums, ..Default::default() }
    }

    #[test]
    fn test_common_header_skeleton() {
        let patterns = ElementPatterns::new();
        let header = common_header(&extraction_with(Vec::new(), Vec::new()), &patterns);

        assert!(header.contains("#ifndef SOD_COMMON_H__"));
        assert!(header.contains("#include <stdlib.h>"));
        assert!(header.contains("#if defined(_WIN32) || defined(_MSC_VER)"));
        assert!(header.contains("#define PATH_MAX 4096"));
        assert!(header.contains("typedef int sod_status;"));
        assert!(header.contains("typedef struct network network;"));
        assert!(header.contains("typedef struct sod_img sod_img;"));
        assert!(header.ends_with("\n#endif /* SOD_COMMON_H__ */\n"));
    }

    #[test]
    fn test_required_constants_come_from_the_source() {
        let patterns = ElementPatterns::new();
        let mac = Element::new("SOD_OK", ElementKind::Macro, "#define SOD_OK 0", 0, 16);
        let header = common_header(&extraction_with(vec![mac], Vec::new()), &patterns);
        assert!(header.contains("/* Required constants */\n#define SOD_OK 0\n"));
    }

    #[test]
    fn test_common_enums_are_cleaned() {
        let patterns = ElementPatterns::new();
        let enm = Element::new(
            "ACTIVATION",
            ElementKind::Enum,
            "typedef enum {\n    LOGISTIC, RELU\n} ACTIVATION;E;",
            0,
            0,
        );
        let other = Element::new("tree_kind", ElementKind::Enum, "typedef enum { LEAF } tree_kind;", 0, 0);
        let header = common_header(&extraction_with(Vec::new(), vec![enm, other]), &patterns);
        assert!(header.contains("} ACTIVATION;\n\n"));
        assert!(!header.contains(";E;"));
        // non-common enums stay out of the shared header
        assert!(!header.contains("tree_kind"));
    }

    #[test]
    fn test_umbrella_lists_modules_once() {
        let header = umbrella(&["img_utils", "common", "cnn"]);
        let expected = "\n/* \n * sod.h - Main header file for the SOD library\n * Generated from the original monolithic code\n */\n\n#ifndef SOD_H__\n#define SOD_H__\n\n/* Include all component headers */\n#include \"sod/sod_common.h\"\n#include \"sod/sod_cnn.h\"\n#include \"sod/sod_img_utils.h\"\n\n#endif /* SOD_H__ */\n";
        pretty_assertions::assert_eq!(header, expected);
    }
}
