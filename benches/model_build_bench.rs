use classmap::{ClassModelBuilder, ModelWalk, Runtime};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn generate_python_module(num_classes: usize, attributes_per_class: usize) -> String {
    let mut code = String::from("from typing import Dict, List, Optional\n\n");

    for i in 0..num_classes {
        let base = if i == 0 {
            String::new()
        } else {
            format!("(Class{})", i - 1)
        };
        code.push_str(&format!("class Class{}{}:\n", i, base));
        code.push_str("    def __init__(self, name: str, size: int, tags: List[str]):\n");
        for j in 0..attributes_per_class {
            let value = match j % 5 {
                0 => "name".to_string(),
                1 => "(size, name, 1.5)".to_string(),
                2 => "{'key': [size]}".to_string(),
                3 => "size if tags else None".to_string(),
                _ => format!("helper_{}()", i),
            };
            code.push_str(&format!("        self.attr_{} = {}\n", j, value));
        }
        code.push_str("\n    def describe(self, verbose: bool = False) -> Optional[str]:\n");
        code.push_str("        pass\n\n");
        code.push_str(&format!(
            "def helper_{}() -> Dict[str, 'Class{}']:\n    pass\n\n",
            i, i
        ));
    }

    code
}

fn benchmark_model_building(c: &mut Criterion) {
    let small_code = generate_python_module(5, 5);
    let large_code = generate_python_module(50, 20);

    c.bench_function("load_module_large", |b| {
        b.iter(|| {
            let mut runtime = Runtime::new();
            runtime.load_source("bench", black_box(&large_code)).unwrap();
            black_box(runtime);
        })
    });

    let mut small = Runtime::new();
    small.load_source("bench", &small_code).unwrap();
    let class = small.class("bench", "Class4").unwrap();
    c.bench_function("build_class_model_small", |b| {
        b.iter(|| {
            let model = ClassModelBuilder::new(&small).build(black_box(&class));
            black_box(model);
        })
    });

    let mut large = Runtime::new();
    large.load_source("bench", &large_code).unwrap();
    c.bench_function("walk_package_large", |b| {
        b.iter(|| {
            let models: Vec<_> = ModelWalk::new(&large, "bench").collect();
            black_box(models);
        })
    });
}

criterion_group!(benches, benchmark_model_building);
criterion_main!(benches);
