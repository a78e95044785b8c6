use ml::{Activation, Dense, Graph, MlError, Tensor};

#[test]
fn dense_forward_known_case() {
    let w = vec![1.0, -1.0, 0.2,
                 0.5, 2.0, 0.2];
    let b = vec![0.1, -0.1];
    let x = Tensor::from_vec(vec![1, 3], vec![1.0, 2.0, 3.0]).unwrap();
    let dense = Dense::new(w, b, 3, 2).unwrap();
    let y = dense.forward(&x, &mut Graph::new()).unwrap();
    assert_eq!(y.shape, vec![1, 2]);
    assert!((y.data[0] - (-0.3)).abs() < 1e-6);
    assert!((y.data[1] - 5.0).abs() < 1e-6);
}

#[test]
fn dense_bias_only() {
    let dense = Dense::new(vec![0.0; 6], vec![0.5, -0.5], 3, 2).unwrap();
    let x = Tensor::from_vec(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let y = dense.forward(&x, &mut Graph::new()).unwrap();
    assert_eq!(y.data, vec![0.5, -0.5, 0.5, -0.5]);
}

#[test]
fn dense_rejects_wrong_input_width() {
    let dense = Dense::new(vec![0.0; 6], vec![0.0; 2], 3, 2).unwrap();
    let x = Tensor::from_vec(vec![1, 2], vec![1.0, 2.0]).unwrap();
    assert!(dense.forward(&x, &mut Graph::new()).is_err());
}

#[test]
fn dense_new_rejects_wrong_parameter_counts() {
    assert!(matches!(
        Dense::new(vec![0.0; 5], vec![0.0; 2], 3, 2),
        Err(MlError::ShapeMismatch { op: "from_vec", .. })
    ));
    assert!(Dense::new(vec![0.0; 6], vec![0.0; 3], 3, 2).is_err());
}

#[test]
fn dense_uniform_init_stays_in_range() {
    let mut rng = fastrand::Rng::with_seed(42);
    let dense = Dense::uniform(4, 3, -0.001, 0.001, &mut rng);
    assert_eq!(dense.w.shape, vec![3, 4]);
    assert_eq!(dense.b.shape, vec![3]);
    assert!(dense.w.requires_grad && dense.b.requires_grad);
    for v in dense.w.data.iter().chain(&dense.b.data) {
        assert!((-0.001..0.001).contains(v), "{v} outside init range");
    }
    let mean: f32 = dense.w.data.iter().sum::<f32>() / dense.w.len() as f32;
    assert!(mean.abs() < 0.001);
}

#[test]
fn activation_parsing_accepts_none_alias() {
    assert_eq!("none".parse::<Activation>().unwrap(), Activation::Identity);
    assert_eq!("ReLU".parse::<Activation>().unwrap(), Activation::Relu);
    assert!("swish".parse::<Activation>().is_err());
}
