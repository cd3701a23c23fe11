//! guiagent-automation 성능 벤치마크
//!
//! 실행: cargo bench -p guiagent-automation
//!
//! 벤치마크 대상:
//! - 분석 → 의도 해석 핫 패스 (합성 분석기 + IntentResolver)
//! - 요소 수에 따른 의도 해석
//! - 워크플로우 컴파일

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::RgbaImage;

use guiagent_automation::intent_resolver::IntentResolver;
use guiagent_automation::workflow::compile;
use guiagent_core::models::analysis::{AnalysisResult, BoundingBox, Element, ElementKind};
use guiagent_core::models::workflow::WorkflowStep;
use guiagent_vision::analyzer::{ScreenAnalyzer, SyntheticAnalyzer};

/// 마지막 요소만 일치하는 N개 요소 분석 결과
fn crowded_analysis(n: usize) -> AnalysisResult {
    let mut elements: Vec<Element> = (0..n.saturating_sub(1))
        .map(|i| {
            let x = (i % 100) as i32 * 10;
            let y = (i / 100) as i32 * 10;
            Element::new(
                ElementKind::Button,
                format!("항목 {i}"),
                BoundingBox::new(x, y, x + 8, y + 8),
                0.9,
                "",
            )
        })
        .collect();
    elements.push(Element::new(
        ElementKind::Button,
        "다음 단계",
        BoundingBox::new(0, 0, 100, 40),
        0.9,
        "",
    ));
    AnalysisResult::succeeded(elements, Vec::new())
}

fn bench_analyze_then_resolve(c: &mut Criterion) {
    let analyzer = SyntheticAnalyzer::new();
    let resolver = IntentResolver::new();
    let frame = RgbaImage::new(1920, 1080);

    c.bench_function("analyze_then_resolve_1080p", |b| {
        b.iter(|| {
            let result = analyzer.analyze(black_box(&frame));
            black_box(resolver.resolve(&result, black_box("신청")))
        })
    });
}

fn bench_resolve_by_element_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_by_element_count");
    let resolver = IntentResolver::new();

    for n in [10usize, 100, 1000] {
        let result = crowded_analysis(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("next", n), &result, |b, result| {
            b.iter(|| black_box(resolver.resolve(result, "next")))
        });
    }

    group.finish();
}

fn bench_workflow_compile(c: &mut Criterion) {
    let steps: Vec<WorkflowStep> = (0..50)
        .flat_map(|i| {
            [
                WorkflowStep::click(format!("버튼 {i}")),
                WorkflowStep::type_text("재택근무 신청"),
                WorkflowStep::wait(0.5),
            ]
        })
        .collect();

    c.bench_function("workflow_compile_150_steps", |b| {
        b.iter(|| black_box(compile(black_box(&steps))))
    });
}

criterion_group!(
    benches,
    bench_analyze_then_resolve,
    bench_resolve_by_element_count,
    bench_workflow_compile
);
criterion_main!(benches);
