use criterion::{black_box, criterion_group, criterion_main, Criterion};
use luxe_scrapers::crawler::harvest_links;
use luxe_scrapers::extract::extract_page;
use luxe_scrapers::normalize::CurrencyRates;
use luxe_scrapers::{Currency, PageContent};

fn detail_page() -> PageContent {
    let mut html = String::from(r#"<html><head><meta property="og:image" content="https://cdn.bayut.test/cover.jpg"></head><body>"#);
    html.push_str("<h1>Signature Villa, Emirates Hills</h1><ul class=\"features\">");
    for i in 0..12 {
        html.push_str(&format!("<li>Feature {}</li>", i));
    }
    html.push_str("</ul>");
    for i in 0..40 {
        html.push_str(&format!(r#"<img src="https://cdn.bayut.test/photos/{}.jpg">"#, i % 30));
    }
    html.push_str("</body></html>");

    let markdown = "# Signature Villa, Emirates Hills\n\nAED 45,000,000\n\n7 Beds | 9 Baths | 18,500 sqft\n\n\
        Location: Emirates Hills, Dubai\n\n\
        An architectural landmark on the golf course with a private spa, cinema and a landscaped garden \
        overlooking the lake. Contact agent John Smith on +971 50 123 4567.\n\n- Private pool\n- Wine cellar\n- Elevator";

    PageContent { markdown: markdown.to_string(), html, ..Default::default() }
}

fn seed_page() -> PageContent {
    let markdown = (0..200)
        .map(|i| format!("[Villa {}](https://www.bayut.com/property/details-{}.html)", i, i))
        .collect::<Vec<_>>()
        .join("\n");
    PageContent::from_markdown(markdown)
}

fn bench_extraction(c: &mut Criterion) {
    let page = detail_page();
    let seed = seed_page();
    let rates = CurrencyRates::default();

    let mut group = c.benchmark_group("extraction");
    group.bench_function("extract_page", |b| b.iter(|| extract_page(black_box(&page))));
    group.bench_function("normalize_price", |b| {
        b.iter(|| rates.normalize_price(black_box("AED 45,000,000"), Some(Currency::Aed)))
    });
    group.bench_function("harvest_links", |b| {
        b.iter(|| harvest_links(black_box(&seed), "https://www.bayut.com/for-sale/villas/dubai/"))
    });
    group.finish();
}

criterion_group!(benches, bench_extraction);
criterion_main!(benches);
