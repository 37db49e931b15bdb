//! Cross-module include inference for implementation units.
//!
//! An implementation file needs another module's header when it mentions
//! one of that module's types or calls into its functions. Both checks are
//! plain substring scans over the element text, backed by an exact match
//! against the recorded dependency names.

use std::collections::BTreeSet;

use sodsplit_core::Element;

/// Type names that pull in another module's header when referenced.
pub(crate) const TYPE_MODULES: &[(&str, &str)] = &[
    ("sod_cnn", "cnn"),
    ("sod_img", "img_utils"),
    ("sod_box", "box_utils"),
    ("box", "box_utils"),
    ("network", "nn_types"),
    ("layer", "nn_types"),
    ("tree", "nn_types"),
    ("ACTIVATION", "activation"),
    ("SOD_CNN_LAYER_TYPE", "nn_types"),
    ("learning_rate_policy", "nn_types"),
    ("COST_TYPE", "nn_types"),
    ("SyBlob", "data_structures"),
    ("SySet", "data_structures"),
    ("SyString", "data_structures"),
    ("sod_vfs", "vfs"),
    ("softmax_layer", "softmax_impl"),
    ("local_layer", "local_layer"),
    ("connected_layer", "connected_impl"),
    ("convolutional_layer", "convolutional"),
    ("cost_layer", "cost_layer"),
    ("route_layer", "route_layer"),
];

/// Function-name prefixes that imply a call into another module.
pub(crate) const PREFIX_MODULES: &[(&str, &str)] = &[
    ("forward_softmax", "softmax_impl"),
    ("backward_softmax", "softmax_impl"),
    ("forward_batchnorm", "batchnorm_impl"),
    ("backward_batchnorm", "batchnorm_impl"),
    ("forward_connected", "connected_impl"),
    ("backward_connected", "connected_impl"),
    ("forward_convolutional", "convolutional"),
    ("backward_convolutional", "convolutional"),
    ("forward_cost", "cost_layer"),
    ("backward_cost", "cost_layer"),
    ("forward_local", "local_layer"),
    ("backward_local", "local_layer"),
    ("forward_route", "route_layer"),
    ("backward_route", "route_layer"),
    ("activate", "activation"),
    ("gradient", "activation"),
    ("SyBlob", "data_structures"),
    ("SySet", "data_structures"),
    ("SyString", "data_structures"),
];

/// Modules whose headers the given elements need, by content inspection.
pub(crate) fn infer(elements: &[Element]) -> BTreeSet<&'static str> {
    let mut includes = BTreeSet::new();

    for elem in elements {
        for &(type_name, module) in TYPE_MODULES {
            if elem.content.contains(type_name) {
                includes.insert(module);
            }
        }
        for &(prefix, module) in PREFIX_MODULES {
            if elem.content.contains(prefix) {
                includes.insert(module);
            }
        }
        // recorded dependencies count only on an exact name match
        for dep in &elem.deps {
            for &(type_name, module) in TYPE_MODULES {
                if dep == type_name {
                    includes.insert(module);
                }
            }
        }
    }

    includes
}
