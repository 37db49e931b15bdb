//! Fixed module registry and pinned declaration lists.
//!
//! The splitting target is the SOD embedded CV library: the module set,
//! the types that must be forward-declared in the common header and the
//! constants every translation unit relies on are all fixed properties
//! of that library, declared here rather than configured at runtime.

/// One target module with its hand-declared dependency list.
///
/// The dependency lists order and document the intended layering; the
/// classifier is free to create edges outside them, which the dependency
/// report surfaces but never rejects.
#[derive(Debug, Clone, Copy)]
pub struct ModuleDef {
    pub name: &'static str,
    pub deps: &'static [&'static str],
}

/// The full module registry, core components first.
pub const MODULES: &[ModuleDef] = &[
    ModuleDef { name: "common", deps: &[] },
    ModuleDef { name: "data_structures", deps: &["common"] },
    ModuleDef { name: "nn_types", deps: &["common", "data_structures"] },
    ModuleDef { name: "activation", deps: &["common", "nn_types"] },
    // Neural network components
    ModuleDef { name: "cpu_utils", deps: &["common", "nn_types", "data_structures"] },
    ModuleDef { name: "nn_utils", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    ModuleDef { name: "cost_layer", deps: &["common", "nn_types", "data_structures", "activation"] },
    ModuleDef { name: "softmax_impl", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    ModuleDef { name: "batchnorm_impl", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    ModuleDef { name: "connected_impl", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    ModuleDef { name: "convolutional", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    ModuleDef { name: "dropout", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    ModuleDef { name: "normalization", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    ModuleDef { name: "local_layer", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    ModuleDef { name: "route_layer", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
    // Image processing and detection
    ModuleDef { name: "box_utils", deps: &["common", "data_structures", "nn_types"] },
    ModuleDef { name: "cnn", deps: &["common", "nn_types", "data_structures", "box_utils", "dropout"] },
    ModuleDef { name: "img_utils", deps: &["common", "data_structures", "box_utils"] },
    ModuleDef { name: "detection", deps: &["common", "nn_types", "data_structures", "box_utils", "cnn", "img_utils", "dropout"] },
    // Miscellaneous utilities
    ModuleDef { name: "vfs", deps: &["common", "data_structures"] },
    ModuleDef { name: "cfg_parser", deps: &["common", "data_structures", "nn_types"] },
    ModuleDef { name: "rnn", deps: &["common", "nn_types", "data_structures", "activation", "cpu_utils"] },
];

/// Look up a module definition by name.
pub fn find(name: &str) -> Option<&'static ModuleDef> {
    MODULES.iter().find(|m| m.name == name)
}

pub fn is_module(name: &str) -> bool {
    find(name).is_some()
}

/// Types forward-declared as `typedef struct X X;` in the common header.
pub const COMMON_TYPES: &[&str] = &[
    "network", "layer", "tree", "box", "sod_cnn", "sod_img", "sod_box",
    "sod_pts", "SyBlob", "SySet", "SyString", "sod_vfs",
    "sod_label_coord", "sod_config_layer", "IplImage", "CvCapture",
    "local_layer", "cost_layer", "avgpool_layer", "connected_layer",
    "convolutional_layer", "detection_layer", "dropout_layer",
    "maxpool_layer", "route_layer", "softmax_layer", "crop_layer",
    "network_state", "size_params", "HANDLE", "WIN32_FIND_DATAW",
];

/// Enumerations whose definitions belong in the common header.
pub const COMMON_ENUMS: &[&str] = &[
    "SOD_CNN_LAYER_TYPE", "ACTIVATION", "COST_TYPE", "learning_rate_policy",
    "SOD_REALNET_NET_TYPE", "SOD_TR_SAMPLE_TYPE",
];

/// Macros every generated translation unit depends on.
pub const REQUIRED_CONSTANTS: &[&str] = &[
    "SOD_OK", "SOD_UNSUPPORTED", "SOD_OUTOFMEM", "SOD_ABORT",
    "SOD_IOERR", "SOD_LIMIT", "SOD_APIEXPORT",
    "MIN", "MAX", "TWO_PI",
];

/// Standard headers emitted at the top of every implementation unit.
pub const STANDARD_HEADERS: &[&str] = &[
    "<stdlib.h>",
    "<stdint.h>",
    "<stddef.h>",
    "<string.h>",
    "<math.h>",
    "<float.h>",
    "<stdio.h>",
];

/// API export macro block for the common header.
pub const API_EXPORT_MACRO: &str = r#"
/* Define SOD API export macro if not already defined */
#ifndef SOD_APIEXPORT
#ifdef _WIN32
  #ifdef SOD_STATIC
    #define SOD_APIEXPORT
  #else
    #ifdef SOD_BUILD
      #define SOD_APIEXPORT __declspec(dllexport)
    #else
      #define SOD_APIEXPORT __declspec(dllimport)
    #endif
  #endif
#else
  #define SOD_APIEXPORT
#endif
#endif /* SOD_APIEXPORT */
"#;

/// Status and callback typedefs for the common header.
pub const REQUIRED_TYPEDEFS: &str = r#"
/* Basic SOD data types */
typedef int sod_status;

/* Function pointer types */
typedef void (*ProcRnnCallback)(void *, int, float);
typedef void (*ProcLogCallback)(void *, int, const char *);
typedef int (*ProcLayerLoad)(void *, const char *);
typedef int (*ProcLayerExec)(void *, int);
typedef void (*ProcLayerRelease)(void *);
"#;
