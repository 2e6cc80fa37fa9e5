use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mindmap_codecs::{parse, serialize, Format};
use mindmap_model::TreeNode;

/// Three levels with `fanout` children per node
fn sample_tree(fanout: usize) -> TreeNode {
    let mut root = TreeNode::new("root", "Quarterly plan").with_notes("owner: ops");
    for i in 0..fanout {
        let mut branch = TreeNode::new(format!("b{}", i), format!("Branch {}", i)).with_tag("branch");
        for j in 0..fanout {
            let mut leaf = TreeNode::new(format!("b{}-{}", i, j), format!("Task {}.{}", i, j));
            for k in 0..fanout {
                leaf.children
                    .push(TreeNode::new(format!("b{}-{}-{}", i, j, k), format!("Step {}", k)));
            }
            branch.children.push(leaf);
        }
        root.children.push(branch);
    }
    root
}

fn serialize_formats(c: &mut Criterion) {
    let tree = sample_tree(8);

    for format in [Format::Native, Format::FreeMind, Format::Opml, Format::Markdown, Format::Dot] {
        c.bench_function(&format!("serialize_{}", format.name()), |b| {
            b.iter(|| serialize(format, black_box(&tree)))
        });
    }
}

fn parse_formats(c: &mut Criterion) {
    let tree = sample_tree(8);

    for format in [Format::Native, Format::Yaml, Format::FreeMind, Format::Opml, Format::Markdown] {
        let text = serialize(format, &tree).expect("sample tree serializes");
        c.bench_function(&format!("parse_{}", format.name()), |b| {
            b.iter(|| parse(format, black_box(&text)))
        });
    }
}

criterion_group!(benches, serialize_formats, parse_formats);
criterion_main!(benches);
