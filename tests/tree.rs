// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! End-to-end lop execution tests, driving [`lopper::Engine`] through the
//! public API the way `lopper.py` scenarios do: build a main tree, build a
//! lop tree whose `compatible` selects a lop kind, run it, inspect the
//! result.

use lopper::lop::loader::LopFile;
use lopper::node::Node;
use lopper::property::Property;
use lopper::value::Value;
use lopper::{Engine, EngineConfig, Tree};

fn amba_main_tree() -> Tree {
    let mut tree = Tree::new();
    let root = tree.root();
    let cpus = tree.add_child(root, Node::new("cpus", None)).unwrap();
    let cpu0 = tree.add_child(cpus, Node::new("cpu@0", None)).unwrap();
    tree.get_mut(cpu0)
        .unwrap()
        .set_property(Property::string("status", "disabled"));
    tree.get_mut(cpu0).unwrap().add_label("cpu0");
    let cpu1 = tree.add_child(cpus, Node::new("cpu@1", None)).unwrap();
    tree.get_mut(cpu1)
        .unwrap()
        .set_property(Property::string("status", "disabled"));
    tree.sync();
    tree
}

fn lop_root_with(compatible: &str) -> (Tree, lopper::node::NodeId) {
    let mut lop_tree = Tree::new();
    let lroot = lop_tree.root();
    let lop_node = lop_tree.add_child(lroot, Node::new("lop_1", None)).unwrap();
    lop_tree
        .get_mut(lop_node)
        .unwrap()
        .set_property(Property::string("compatible", compatible));
    lop_tree.sync();
    (lop_tree, lop_node)
}

#[test]
fn modify_lop_sets_a_property_via_label_reference() {
    let mut lop_tree = amba_main_tree();
    let cpu0 = lop_tree.lookup_by_path("/cpus/cpu@0").unwrap();
    let _ = cpu0;
    let (mut lop_tree, lop_node) = lop_root_with("system-device-tree-v1,lop,modify");
    lop_tree
        .get_mut(lop_node)
        .unwrap()
        .set_property(Property::string(
            "modify",
            "/cpus/cpu@0:status:okay",
        ));
    lop_tree.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    engine.run(vec![LopFile::from_tree(lop_tree)]).unwrap();

    let cpu0 = engine.main().lookup_by_path("/cpus/cpu@0").unwrap();
    assert_eq!(
        engine.main().get(cpu0).unwrap().property("status").unwrap().value(),
        &Value::Str("okay".into())
    );
}

#[test]
fn modify_lop_deletes_a_property() {
    let (mut lop_tree, lop_node) = lop_root_with("system-device-tree-v1,lop,modify");
    lop_tree
        .get_mut(lop_node)
        .unwrap()
        .set_property(Property::string("modify", "/cpus/cpu@1:status:"));
    lop_tree.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    engine.run(vec![LopFile::from_tree(lop_tree)]).unwrap();

    let cpu1 = engine.main().lookup_by_path("/cpus/cpu@1").unwrap();
    assert!(engine.main().get(cpu1).unwrap().property("status").is_none());
}

#[test]
fn select_lop_populates_the_selection_set() {
    let (mut lop_tree, lop_node) = lop_root_with("system-device-tree-v1,lop,select");
    lop_tree
        .get_mut(lop_node)
        .unwrap()
        .set_property(Property::string("select_1", "/cpus/cpu.*"));
    lop_tree.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    engine.run(vec![LopFile::from_tree(lop_tree)]).unwrap();

    assert_eq!(engine.main().selection().len(), 2);
}

#[test]
fn priority_orders_lop_files_ascending() {
    let (mut low, low_node) = lop_root_with("system-device-tree-v1,lop,modify");
    low.get_mut(low_node)
        .unwrap()
        .set_property(Property::string("modify", "/cpus/cpu@0:status:from-low"));
    low.get_mut(low.root())
        .unwrap()
        .set_property(Property::u32("priority", 1));
    low.sync();

    let (mut high, high_node) = lop_root_with("system-device-tree-v1,lop,modify");
    high.get_mut(high_node)
        .unwrap()
        .set_property(Property::string("modify", "/cpus/cpu@0:status:from-high"));
    high.get_mut(high.root())
        .unwrap()
        .set_property(Property::u32("priority", 9));
    high.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    engine
        .run(vec![LopFile::from_tree(high), LopFile::from_tree(low)])
        .unwrap();

    let cpu0 = engine.main().lookup_by_path("/cpus/cpu@0").unwrap();
    assert_eq!(
        engine.main().get(cpu0).unwrap().property("status").unwrap().value(),
        &Value::Str("from-high".into())
    );
}

#[test]
fn noexec_node_is_skipped() {
    let (mut lop_tree, lop_node) = lop_root_with("system-device-tree-v1,lop,modify");
    lop_tree
        .get_mut(lop_node)
        .unwrap()
        .set_property(Property::string("modify", "/cpus/cpu@0:status:should-not-apply"));
    lop_tree.get_mut(lop_node).unwrap().set_property(Property::flag("noexec"));
    lop_tree.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    engine.run(vec![LopFile::from_tree(lop_tree)]).unwrap();

    let cpu0 = engine.main().lookup_by_path("/cpus/cpu@0").unwrap();
    assert_eq!(
        engine.main().get(cpu0).unwrap().property("status").unwrap().value(),
        &Value::Str("disabled".into())
    );
}
