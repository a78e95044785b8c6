use criterion::{criterion_group, criterion_main, Criterion};
use rl::{AgentConfig, Transition};

fn bench_critic_train_step(c: &mut Criterion) {
    let cfg = AgentConfig::default();
    let mut rng = fastrand::Rng::with_seed(0);
    let policy = cfg.build_policy(&mut rng).unwrap();
    let mut critic = cfg.build_critic(&mut rng).unwrap();
    let batch: Vec<Transition> = (0..cfg.batch_size)
        .map(|i| {
            let x = i as f32 * 0.1;
            Transition::new(vec![x.cos(), x.sin(), x], vec![x.sin(), x.cos(), -x], vec![x], 1.0)
        })
        .collect();

    c.bench_function("critic_train_step", |b| {
        b.iter(|| critic.train_step(&batch, &policy).unwrap());
    });

    c.bench_function("policy_act", |b| {
        b.iter(|| policy.act(&[0.1, 0.2, 0.3]).unwrap());
    });
}

criterion_group!(benches, bench_critic_train_step);
criterion_main!(benches);
