use ml::{Activation, Sgd, Tensor};
use rl::{ApproximatorBuilder, RlError};

fn batch(rows: usize, cols: usize) -> Tensor {
    let data = (0..rows * cols).map(|i| (i as f32 * 0.37).sin()).collect();
    Tensor::from_vec(vec![rows, cols], data).unwrap()
}

#[test]
fn evaluate_is_deterministic() {
    let mut rng = fastrand::Rng::with_seed(1);
    let net = ApproximatorBuilder::new(4)
        .layers(&[100, 50, 1])
        .activation(Activation::Relu)
        .build(&mut rng)
        .unwrap();
    let x = batch(7, 4);
    let a = net.evaluate(&x).unwrap();
    let b = net.evaluate(&x).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn evaluate_shape_contract() {
    let mut rng = fastrand::Rng::with_seed(2);
    let net = ApproximatorBuilder::new(3).layers(&[8, 2]).build(&mut rng).unwrap();
    for n in [1, 2, 5, 33] {
        let out = net.evaluate(&batch(n, 3)).unwrap();
        assert_eq!(out.shape, vec![n, 2]);
    }
}

#[test]
fn evaluate_rejects_wrong_width() {
    let mut rng = fastrand::Rng::with_seed(3);
    let net = ApproximatorBuilder::new(3).layers(&[8, 2]).build(&mut rng).unwrap();
    let err = net.evaluate(&batch(2, 4)).unwrap_err();
    assert!(matches!(err, RlError::ShapeMismatch { expected: 3, actual: 4, .. }));
    assert!(net.evaluate_rows(&[vec![1.0, 2.0]]).is_err());
}

#[test]
fn small_init_keeps_outputs_near_zero() {
    let mut rng = fastrand::Rng::with_seed(4);
    let net = ApproximatorBuilder::new(3).layers(&[100, 50, 1]).build(&mut rng).unwrap();
    assert!(net.parameters().flat_map(|p| p.data.iter()).all(|v| v.abs() <= 0.001));
    let out = net.evaluate_rows(&[vec![1.0, -1.0, 0.5]]).unwrap();
    assert!(out.data[0].abs() < 0.01);
}

#[test]
fn identity_activation_composes_linearly() {
    // with no nonlinearity f(x + y) - f(y) == f(x) - f(0)
    let mut rng = fastrand::Rng::with_seed(5);
    let net = ApproximatorBuilder::new(2)
        .layers(&[6, 1])
        .init_range(0.5)
        .build(&mut rng)
        .unwrap();
    let out = net
        .evaluate_rows(&[vec![1.0, 2.0], vec![0.5, -1.0], vec![1.5, 1.0], vec![0.0, 0.0]])
        .unwrap();
    let lhs = out.data[2] - out.data[1];
    let rhs = out.data[0] - out.data[3];
    assert!((lhs - rhs).abs() < 1e-5);
}

#[test]
fn relu_applies_to_hidden_layers_only() {
    let mut rng = fastrand::Rng::with_seed(8);
    let net = ApproximatorBuilder::new(2)
        .layers(&[8, 1])
        .activation(Activation::Relu)
        .init_range(1.0)
        .build(&mut rng)
        .unwrap();
    let params: Vec<&Tensor> = net.parameters().collect();
    let (w1, b1, w2, b2) = (params[0], params[1], params[2], params[3]);

    let inputs: Vec<Vec<f32>> = (0..16)
        .map(|i| {
            let a = i as f32 * 0.4;
            vec![3.0 * a.cos(), 3.0 * a.sin()]
        })
        .collect();
    let out = net.evaluate_rows(&inputs).unwrap();

    let mut clamped = 0;
    for (x, y) in inputs.iter().zip(&out.data) {
        let hidden: Vec<f32> = (0..8)
            .map(|o| {
                let z = b1.data[o] + w1.data[o * 2] * x[0] + w1.data[o * 2 + 1] * x[1];
                if z < 0.0 {
                    clamped += 1;
                }
                z.max(0.0)
            })
            .collect();
        // no clamp on the head
        let expected = b2.data[0] + hidden.iter().zip(&w2.data).map(|(h, w)| h * w).sum::<f32>();
        assert!((y - expected).abs() < 1e-5, "{y} vs {expected}");
    }
    assert!(clamped > 0, "no hidden unit was negative before the activation");
}

#[test]
fn fit_reduces_regression_loss() {
    let mut rng = fastrand::Rng::with_seed(6);
    let mut net = ApproximatorBuilder::new(2)
        .layers(&[8, 1])
        .activation(Activation::Tanh)
        .init_range(0.3)
        .build(&mut rng)
        .unwrap();
    let x = Tensor::from_vec(vec![4, 2], vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).unwrap();
    let t = Tensor::from_vec(vec![4, 1], vec![0.0, 1.0, 1.0, 2.0]).unwrap();
    let mut opt = Sgd::new(0.05);
    let first = net.fit(&x, &t, &mut opt).unwrap();
    let mut last = first;
    for _ in 0..300 {
        last = net.fit(&x, &t, &mut opt).unwrap();
    }
    assert!(last < first * 0.1, "loss went from {first} to {last}");
}

#[test]
fn fit_rejects_mismatched_targets() {
    let mut rng = fastrand::Rng::with_seed(7);
    let mut net = ApproximatorBuilder::new(2).layers(&[4, 1]).build(&mut rng).unwrap();
    let x = batch(3, 2);
    let t = Tensor::zeros(vec![2, 1]);
    assert!(net.fit(&x, &t, &mut Sgd::new(0.1)).is_err());
}
