use ml::*;

fn grads_for(param: &Tensor) -> Gradients {
    // d/dp of sum(0.5 * p^2) is p itself
    let mut tape = Tape::new();
    let loss = param.pow(2.0, &mut tape).mul_scalar(0.5, &mut tape).reduce_sum(&mut tape);
    tape.backward(&loss).unwrap()
}

#[test]
fn sgd_update() {
    let mut param = Tensor::from_vec(vec![2], vec![1.0, -1.0]).unwrap().with_grad();
    let grads = grads_for(&param);
    let mut opt = Sgd::new(0.1);
    opt.step(&mut [&mut param], &grads).unwrap();
    assert!((param.data[0] - 0.9).abs() < 1e-6);
    assert!((param.data[1] + 0.9).abs() < 1e-6);
}

#[test]
fn adam_first_step_moves_by_learning_rate() {
    let mut param = Tensor::from_vec(vec![1], vec![1.0]).unwrap().with_grad();
    let grads = grads_for(&param);
    let mut opt = Adam::new(0.1);
    opt.step(&mut [&mut param], &grads).unwrap();
    // bias-corrected moments make the first step exactly lr * sign(grad)
    assert!((param.data[0] - 0.9).abs() < 1e-5);
}

#[test]
fn missing_gradient_is_an_error_and_leaves_params_alone() {
    let mut seen = Tensor::from_vec(vec![1], vec![2.0]).unwrap().with_grad();
    let mut unseen = Tensor::from_vec(vec![1], vec![5.0]).unwrap().with_grad();
    let grads = grads_for(&seen);
    let mut opt = Sgd::new(0.5);
    let err = opt.step(&mut [&mut seen, &mut unseen], &grads).unwrap_err();
    assert_eq!(err, MlError::MissingGradient(unseen.id));
    assert_eq!(seen.data, vec![2.0]);
}

#[test]
fn optimizer_kind_builds_and_parses() {
    assert_eq!("adam".parse::<OptimizerKind>().unwrap(), OptimizerKind::Adam);
    assert!("rmsprop".parse::<OptimizerKind>().is_err());

    let mut param = Tensor::from_vec(vec![1], vec![1.0]).unwrap().with_grad();
    let grads = grads_for(&param);
    let mut opt = OptimizerKind::default().build(0.25);
    opt.step(&mut [&mut param], &grads).unwrap();
    assert!((param.data[0] - 0.75).abs() < 1e-6);
}
