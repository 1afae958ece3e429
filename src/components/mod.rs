pub mod skill_tree;
