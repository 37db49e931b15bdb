//! Name-based routing rules, one table per element kind
//!
//! Each rule set is ordered and the first match wins. Rules look only at the
//! symbol name; pinned names (common types, common enums, required constants)
//! are applied by the classifier before these tables run.

/// Substring routes for `forward_` / `backward_` pass functions.
const PASS_ROUTES: &[(&str, &str)] = &[
    ("softmax", "softmax_impl"),
    ("batchnorm", "batchnorm_impl"),
    ("connected", "connected_impl"),
    ("convolutional", "convolutional"),
    ("local", "local_layer"),
    ("cost", "cost_layer"),
    ("route", "route_layer"),
];

/// Substring routes for `make_` constructors. Convolutional construction is
/// not routed and falls through to the network utilities.
const MAKE_ROUTES: &[(&str, &str)] = &[
    ("softmax", "softmax_impl"),
    ("batchnorm", "batchnorm_impl"),
    ("connected", "connected_impl"),
    ("local", "local_layer"),
    ("cost", "cost_layer"),
    ("route", "route_layer"),
];

/// Prefixes of activation functions and their derivatives.
const ACTIVATION_PREFIXES: &[&str] = &[
    "relu_", "logistic_", "tanh_", "elu_", "leaky_", "activate", "gradient", "stair_",
    "hardtan_", "lhtan_", "relie_", "ramp_", "plse_", "loggy_",
];

/// Prefixes of the embedded container library.
const CONTAINER_PREFIXES: &[&str] = &["SyBlob", "SySet", "SyString"];

/// Prefixes of the virtual file system layer.
const VFS_PREFIXES: &[&str] = &["UnixVfs", "WinVfs", "UnixDir", "WinDir"];

/// Prefixes of the network configuration parser.
const CFG_PREFIXES: &[&str] = &["parse_", "option_", "load_"];

fn route(name: &str, table: &[(&str, &'static str)]) -> Option<&'static str> {
    table
        .iter()
        .find(|(needle, _)| name.contains(needle))
        .map(|&(_, module)| module)
}

fn any_prefix(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p))
}

/// Module for a function, by name.
pub fn function_module(name: &str) -> &'static str {
    let lower = name.to_lowercase();

    if name.starts_with("forward_") || name.starts_with("backward_") {
        return route(name, PASS_ROUTES).unwrap_or("nn_utils");
    }
    if name.starts_with("make_") {
        return route(name, MAKE_ROUTES).unwrap_or("nn_utils");
    }
    if any_prefix(name, ACTIVATION_PREFIXES) {
        return "activation";
    }
    if any_prefix(name, CONTAINER_PREFIXES) {
        return "data_structures";
    }
    if any_prefix(name, VFS_PREFIXES) {
        return "vfs";
    }
    if lower.contains("box") {
        return "box_utils";
    }
    if lower.contains("img") || lower.contains("image") {
        return "img_utils";
    }
    if name.ends_with("_cpu") {
        return "cpu_utils";
    }
    if lower.contains("rnn") || lower.contains("gru") || lower.contains("lstm") {
        return "rnn";
    }
    if lower.contains("cnn") {
        return "cnn";
    }
    if lower.contains("detect") || lower.contains("realnet") {
        return "detection";
    }
    if any_prefix(name, CFG_PREFIXES) {
        return "cfg_parser";
    }
    "nn_utils"
}

/// Module for a struct, by name.
pub fn struct_module(name: &str) -> &'static str {
    let lower = name.to_lowercase();

    match name {
        "layer" | "network" | "network_state" | "size_params" => return "nn_types",
        "SyBlob" | "SySet" | "SyString" => return "data_structures",
        _ => {}
    }
    if lower.contains("box") {
        return "box_utils";
    }
    if lower.contains("img") || lower.contains("image") {
        return "img_utils";
    }
    if lower.contains("vfs") {
        return "vfs";
    }
    if lower.contains("cnn") {
        return "cnn";
    }
    if lower.contains("detect") || lower.contains("realnet") {
        return "detection";
    }
    if ["config", "list", "section", "node"].iter().any(|x| lower.contains(x)) {
        return "cfg_parser";
    }
    "data_structures"
}

/// Module for an enum, by name. Pinned common enums never reach this rule.
pub fn enum_module(name: &str) -> &'static str {
    if ["ACTIVATION", "COST_TYPE", "layer_type"].iter().any(|x| name.contains(x)) {
        return "nn_types";
    }
    if name.contains("CNN") {
        return "cnn";
    }
    if name.contains("REALNET") || name.contains("TR_SAMPLE") {
        return "detection";
    }
    "common"
}

/// Module for a typedef, by name.
pub fn typedef_module(name: &str) -> &'static str {
    let lower = name.to_lowercase();

    if ["network", "layer", "cost", "activation"].iter().any(|x| name.contains(x)) {
        return "nn_types";
    }
    if ["Sy", "blob", "set", "string"].iter().any(|x| name.contains(x)) {
        return "data_structures";
    }
    if ["img", "image", "ipl"].iter().any(|x| lower.contains(x)) {
        return "img_utils";
    }
    if ["detect", "box", "pts"].iter().any(|x| lower.contains(x)) {
        return "detection";
    }
    if ["vfs", "file", "dir"].iter().any(|x| lower.contains(x)) {
        return "vfs";
    }
    "common"
}

/// Module for a global variable, by name.
pub fn global_module(name: &str) -> &'static str {
    let lower = name.to_lowercase();

    if ["weights", "biases", "scales", "rolling", "adam"].iter().any(|x| name.contains(x)) {
        return "nn_utils";
    }
    if name.contains("activate") || name.contains("gradient") {
        return "activation";
    }
    if ["img", "image", "pixel"].iter().any(|x| lower.contains(x)) {
        return "img_utils";
    }
    if ["detect", "box", "anchor"].iter().any(|x| lower.contains(x)) {
        return "detection";
    }
    if ["file", "dir", "path"].iter().any(|x| lower.contains(x)) {
        return "vfs";
    }
    if lower.contains("cnn") {
        return "cnn";
    }
    "common"
}

/// Module for a macro, by name. Required constants never reach this rule.
pub fn macro_module(name: &str) -> &'static str {
    let lower = name.to_lowercase();

    if ["LAYER", "ACTIVATION", "WEIGHT"].iter().any(|x| name.contains(x)) {
        return "nn_types";
    }
    if ["img", "image", "pixel"].iter().any(|x| lower.contains(x)) {
        return "img_utils";
    }
    if ["BOX", "DETECT", "CNN"].iter().any(|x| name.contains(x)) {
        return "detection";
    }
    if ["FILE", "DIR", "PATH"].iter().any(|x| name.contains(x)) {
        return "vfs";
    }
    "common"
}
