#![allow(dead_code)]
#![deny(rust_2018_idioms)]

pub mod binary_search_tree;
pub mod llrb;
