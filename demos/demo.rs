// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

use std::env;

use lopper::lop::loader::LopFile;
use lopper::node::{Node, NodeId};
use lopper::property::Property;
use lopper::{Engine, EngineConfig, Tree};

fn main() {
    let args: Vec<String> = env::args().collect();
    let demo = if args.len() > 1 { &args[1] } else { "" };

    match demo {
        "demo_modify" => demo_modify(),
        "demo_conditional" => demo_conditional(),
        "demo_select_and_print" => demo_select_and_print(),
        "demo_add_and_move" => demo_add_and_move(),
        _ => print_help(),
    }
}

fn print_help() {
    let buf = "
Usage: demo <demo>

<demo> can be any of:
  demo_modify
  demo_conditional
  demo_select_and_print
  demo_add_and_move

";
    println!("{}", buf);
}

fn amba_main_tree() -> Tree {
    let mut tree = Tree::new();
    let root = tree.root();
    let cpus = tree.add_child(root, Node::new("cpus", None)).unwrap();
    for (i, name) in ["cpu@0", "cpu@1"].iter().enumerate() {
        let cpu = tree.add_child(cpus, Node::new(*name, None)).unwrap();
        tree.get_mut(cpu)
            .unwrap()
            .set_property(Property::string("status", "disabled"));
        tree.get_mut(cpu).unwrap().add_label(format!("cpu{}", i));
    }
    tree.sync();
    tree
}

fn lop_node(lop_tree: &mut Tree, name: &str, compatible: &str) -> NodeId {
    let root = lop_tree.root();
    let mut node = Node::new(name, None);
    node.set_property(Property::string("compatible", compatible));
    lop_tree.add_child(root, node).unwrap()
}

// Applies a single `modify` lop that brings cpu@0 online, then prints
// the resulting tree.
fn demo_modify() {
    let mut lop_tree = Tree::new();
    let id = lop_node(&mut lop_tree, "enable-cpu0", "system-device-tree-v1,lop,modify");
    lop_tree
        .get_mut(id)
        .unwrap()
        .set_property(Property::string("modify", "/cpus/cpu@0:status:okay"));
    lop_tree.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    println!("before:");
    print_tree(engine.main(), engine.main().root(), 0);

    engine.run(vec![LopFile::from_tree(lop_tree)]).unwrap();

    println!("\nafter:");
    print_tree(engine.main(), engine.main().root(), 0);
}

// Applies a `conditional` lop that only enables cpu@0 if its status is
// already "disabled", demonstrating the chain-match/true-branch path.
fn demo_conditional() {
    let mut lop_tree = Tree::new();
    let cond = lop_node(&mut lop_tree, "only-if-disabled", "system-device-tree-v1,lop,conditional");
    let cpus = lop_tree.add_child(cond, Node::new("cpus", None)).unwrap();
    let cpu0 = lop_tree.add_child(cpus, Node::new("cpu@0", None)).unwrap();
    lop_tree
        .get_mut(cpu0)
        .unwrap()
        .set_property(Property::string("status", "disabled"));

    let mut true_node = Node::new("true1", None);
    true_node.set_property(Property::string("compatible", "system-device-tree-v1,lop,modify"));
    true_node.set_property(Property::string("modify", "/cpus/cpu@0:status:okay"));
    lop_tree.add_child(cond, true_node).unwrap();
    lop_tree.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    engine.run(vec![LopFile::from_tree(lop_tree)]).unwrap();

    println!("result:");
    print_tree(engine.main(), engine.main().root(), 0);
}

// Selects both cpu nodes, then prints the selection via a `print` lop.
fn demo_select_and_print() {
    let mut lop_tree = Tree::new();
    let select_id = lop_node(&mut lop_tree, "pick-cpus", "system-device-tree-v1,lop,select");
    lop_tree
        .get_mut(select_id)
        .unwrap()
        .set_property(Property::string("select_1", "/cpus/cpu.*"));
    lop_tree.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    engine.run(vec![LopFile::from_tree(lop_tree)]).unwrap();

    println!("selected {} node(s):", engine.main().selection().len());
    for id in engine.main().selection() {
        println!("  {}", engine.main().path_of(*id));
    }
}

// Copies cpu@0 to a new sibling node and renames cpu@1's parent path,
// showing `deep_copy`/`graft` and the `modify` move form together.
fn demo_add_and_move() {
    let mut lop_tree = Tree::new();
    let add_id = lop_node(&mut lop_tree, "clone-cpu0", "system-device-tree-v1,lop,add");
    lop_tree
        .get_mut(add_id)
        .unwrap()
        .set_property(Property::string("node_src", "cpu@2"));
    lop_tree
        .get_mut(add_id)
        .unwrap()
        .set_property(Property::string("node_dest", "/cpus/cpu@2"));
    let src = lop_tree.add_child(add_id, Node::new("cpu@2", None)).unwrap();
    lop_tree
        .get_mut(src)
        .unwrap()
        .set_property(Property::string("status", "disabled"));
    lop_tree.sync();

    let mut engine = Engine::new(amba_main_tree(), EngineConfig::default());
    engine.run(vec![LopFile::from_tree(lop_tree)]).unwrap();

    println!("after clone:");
    print_tree(engine.main(), engine.main().root(), 0);
}

fn print_tree(tree: &Tree, id: NodeId, depth: usize) {
    let node = tree.get(id).unwrap();
    let label = if node.name().is_empty() { "/" } else { node.name() };
    println!("{:indent$}{}", "", label, indent = depth * 2);
    for prop in node.properties() {
        println!("{:indent$}  {} = {}", "", prop.name(), prop.value(), indent = depth * 2);
    }
    for &child in node.children() {
        print_tree(tree, child, depth + 1);
    }
}
